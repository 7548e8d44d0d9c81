//! Web form adapter.
//!
//! - `GET /`                     empty search form
//! - `GET /lookup?regno=`        result page; failures shown as a banner
//! - `GET /api/vehicle/{regno}`  shaped sections as JSON
//! - `GET /healthz`              liveness
//!
//! The web path has no quota. Input is trimmed and upper-cased before it is
//! validated, as the form does while the user types.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::error::{LookupError, DEFAULT_UPSTREAM_MESSAGE};
use crate::lookup::VehicleLookup;
use crate::regno::{self, RegNo, FORMAT_HINT, INVALID_INPUT};
use crate::render::html::{render_page, PageView};
use crate::shape::{shape_record, DisplaySection, Layout, MaskMode};
use crate::vehicle::VehicleRecord;

#[derive(Clone)]
pub struct AppState {
    lookup: Arc<dyn VehicleLookup>,
    contact: Option<Arc<str>>,
}

impl AppState {
    pub fn new(lookup: Arc<dyn VehicleLookup>) -> Self {
        Self {
            lookup,
            contact: None,
        }
    }

    /// Handle linked in the page footer.
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(Arc::from(contact.into()));
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/lookup", get(lookup_page))
        .route("/api/vehicle/{regno}", get(api_vehicle))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    tracing::info!("web form listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("web server")?;

    tracing::info!("web server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&PageView {
        contact: state.contact.as_deref(),
        ..Default::default()
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    #[serde(default)]
    pub regno: String,
}

async fn lookup_page(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Html<String> {
    let contact = state.contact.as_deref();
    if params.regno.trim().is_empty() {
        return Html(render_page(&PageView {
            contact,
            ..Default::default()
        }));
    }

    let outcome = match regno::normalize(&params.regno) {
        Ok(reg) => fetch(&state, reg).await,
        Err(e) => Err(e),
    };

    let page = match outcome {
        Ok(record) => {
            let sections = shape_record(&record, Layout::Card, MaskMode::Suppress);
            let query = record.registration_number().unwrap_or_default();
            render_page(&PageView {
                query: &query,
                record: Some(&record),
                sections: &sections,
                contact,
                ..Default::default()
            })
        }
        Err(e) => {
            let message = page_error(&e);
            render_page(&PageView {
                query: params.regno.trim(),
                error: Some(&message),
                contact,
                ..Default::default()
            })
        }
    };
    Html(page)
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiParams {
    #[serde(default)]
    pub mask: Option<MaskMode>,
}

#[derive(Debug, Serialize)]
struct VehicleResponse {
    registration: String,
    sections: Vec<DisplaySection>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn api_vehicle(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Query<ApiParams>,
) -> Response {
    let result = match regno::normalize(&raw) {
        Ok(reg) => fetch(&state, reg).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(record) => {
            let mode = params.mask.unwrap_or(Layout::Card.default_mask_mode());
            let body = VehicleResponse {
                registration: record.registration_number().unwrap_or_default(),
                sections: shape_record(&record, Layout::Card, mode),
            };
            Json(body).into_response()
        }
        Err(e) => {
            let status = match &e {
                LookupError::Validation(_) => StatusCode::BAD_REQUEST,
                LookupError::Upstream(_) => StatusCode::BAD_GATEWAY,
                LookupError::QuotaExhausted { .. } => StatusCode::TOO_MANY_REQUESTS,
                LookupError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let body = ErrorResponse {
                error: page_error(&e),
            };
            (status, Json(body)).into_response()
        }
    }
}

/// Run the blocking upstream call off the async workers.
async fn fetch(state: &AppState, reg: RegNo) -> Result<VehicleRecord, LookupError> {
    let lookup = Arc::clone(&state.lookup);
    match tokio::task::spawn_blocking(move || lookup.fetch(&reg)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "lookup task failed");
            Err(LookupError::upstream(DEFAULT_UPSTREAM_MESSAGE))
        }
    }
}

/// Text shown to the visitor for a failed lookup.
fn page_error(e: &LookupError) -> String {
    match e {
        LookupError::Validation(_) => format!("{INVALID_INPUT} {}", FORMAT_HINT.replace('\n', ". ")),
        LookupError::Upstream(message) => message.clone(),
        LookupError::QuotaExhausted { .. } => e.to_string(),
        LookupError::Storage(inner) => {
            tracing::error!(error = %inner, "storage failure on web path");
            DEFAULT_UPSTREAM_MESSAGE.to_string()
        }
    }
}
