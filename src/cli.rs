use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding config.yaml
    #[clap(long, env = "PREVIEW_API_CONFIG_DIR", default_value = ".")]
    pub config_dir: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the http server
    Daemon {
        /// Listen address, overrides bind_addr from config
        #[clap(long)]
        bind: Option<String>,
    },

    /// Fetch a page once and print the result
    Fetch {
        /// a url
        url: String,
    },

    /// Extract metadata from an html document
    Extract {
        /// Read the document from this file instead of stdin
        #[clap(short, long)]
        file: Option<String>,
    },
}
