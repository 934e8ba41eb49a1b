use crate::{
    app::{AppError, AppService},
    config::Config,
    metadata::{self, ExtractedMetadata},
    previews::{GeneratePreviewRequest, PreviewResponse, RetrievePreviewResponse},
    scrape::{self, FetchResult},
    storage::Store,
    submissions::SubmitUrlResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{fmt::Debug, sync::Arc};
use tokio::signal;

#[derive(Clone)]
struct SharedState {
    app: Arc<AppService>,
}

/// Builds the api router. With `uniform_error_status` every error response
/// is answered with 500, whatever its kind.
pub fn router(app: Arc<AppService>, uniform_error_status: bool) -> Router {
    let shared_state = Arc::new(SharedState { app });

    let router = Router::new()
        .route("/retrieve-preview/:id", get(retrieve_preview))
        .route("/submit-url", post(submit_url))
        .route("/fetch-content", post(fetch_content))
        .route("/generate-preview", post(generate_preview))
        .route("/extract-metadata", post(extract_metadata))
        .with_state(shared_state);

    if uniform_error_status {
        router.layer(middleware::map_response(collapse_error_status))
    } else {
        router
    }
}

async fn start_app(config: Config, store: Arc<dyn Store>) -> anyhow::Result<()> {
    async fn shutdown_signal() {
        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                log::error!("failed to install Ctrl+C handler: {err}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(err) => {
                    log::error!("failed to install signal handler: {err}");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        log::warn!("shutting down");
    }

    let app = Arc::new(AppService::new(
        store,
        scrape::client()?,
        metadata::extractor_for(config.extractor),
    ));

    let app = router(app, config.uniform_error_status).layer(
        tower_http::trace::TraceLayer::new_for_http()
            .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
            .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO)),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Serves the api until Ctrl+C or SIGTERM. The store is released when this
/// returns.
pub fn start_daemon(config: Config, store: Arc<dyn Store>) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_app(config, store))
}

/// Marks responses produced from an `AppError`.
#[derive(Clone, Copy, Debug)]
struct ErrorResponse;

#[derive(Debug)]
struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => {
                log::error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Serde(_) => {
                log::error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Other(_) => {
                log::error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_client_error() {
            log::warn!("{}", self.0);
        }

        let mut response = (status, Json(json!({"error": self.0.to_string()}))).into_response();
        response.extensions_mut().insert(ErrorResponse);
        response
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

async fn collapse_error_status(mut response: Response) -> Response {
    if response.extensions().get::<ErrorResponse>().is_some() {
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    }
    response
}

async fn retrieve_preview(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<String>,
) -> Result<Json<RetrievePreviewResponse>, HttpError> {
    log::debug!("id: {id}");

    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        app.retrieve_preview(&id)
            .map(Into::into)
            .map_err(Into::into)
    })
}

#[derive(Deserialize, Serialize)]
pub struct SubmitUrlParams {
    pub url: String,
    pub user_token: String,
}

impl Debug for SubmitUrlParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SubmitUrlParams {{ url: {:?}, user_token: [REDACTED] }}",
            self.url
        )
    }
}

// TODO: accept the token from an Authorization header once clients move off
// the query parameter.
async fn submit_url(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<SubmitUrlParams>, QueryRejection>,
) -> Result<Json<SubmitUrlResponse>, HttpError> {
    let Query(params) = params?;

    log::debug!("params: {params:?}");

    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        app.submit_url(&params.url, &params.user_token)
            .map(Into::into)
            .map_err(Into::into)
    })
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FetchContentParams {
    pub url: String,
}

async fn fetch_content(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<FetchContentParams>, QueryRejection>,
) -> Result<Json<FetchResult>, HttpError> {
    let Query(params) = params?;

    log::debug!("params: {params:?}");

    Ok(state.app.fetch_content(&params.url).await.into())
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GeneratePreviewParams {
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub url: String,
}

/// Text fields come from the query string, `keywords` is the body as a bare
/// json array.
async fn generate_preview(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<GeneratePreviewParams>, QueryRejection>,
    keywords: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<Json<PreviewResponse>, HttpError> {
    let Query(params) = params?;
    let Json(keywords) = keywords?;

    log::debug!("params: {params:?} keywords: {keywords:?}");

    let request = GeneratePreviewRequest {
        title: params.title,
        description: params.description,
        thumbnail_url: params.thumbnail_url,
        url: params.url,
        keywords,
    };

    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        app.generate_preview(request)
            .map(Into::into)
            .map_err(Into::into)
    })
}

#[derive(Deserialize, Serialize)]
pub struct ExtractMetadataParams {
    pub raw_html_content: String,
}

async fn extract_metadata(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<ExtractMetadataParams>, QueryRejection>,
) -> Result<Json<ExtractedMetadata>, HttpError> {
    let Query(params) = params?;

    log::debug!("raw_html_content: {} bytes", params.raw_html_content.len());

    Ok(state.app.extract_metadata(&params.raw_html_content).into())
}
