pub mod errors;
pub mod service;

pub use errors::AppError;
pub use service::AppService;
