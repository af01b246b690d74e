use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::assemble::assemble;
use crate::config::CountryConfig;
use crate::error::PageError;
use crate::page::render_page;
use crate::regions::RegionSet;
use crate::selection::SelectionSettings;

pub struct AppState {
    pub config: CountryConfig,
    pub regions: RegionSet,
    pub selection: SelectionSettings,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(map_view))
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let country = state.config.key;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, country, "serving map");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn map_view(State(state): State<Arc<AppState>>) -> Response {
    // Mask and document are rebuilt per request; geometry work stays off the
    // async workers.
    let result = tokio::task::spawn_blocking(move || -> Result<String, PageError> {
        let doc = assemble(&state.config, &state.regions, state.selection);
        render_page(&doc, state.config.viewport_meta)
    })
    .await
    .map_err(PageError::from)
    .and_then(|page| page);

    match result {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render map page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render map page").into_response()
        }
    }
}
