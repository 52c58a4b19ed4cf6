use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

pub async fn health_check() -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": "controladoria-juridica",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn ready_check(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    // Testa a conexão com o backend hospedado
    let backend_status = match state.casos.ping().await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let overall_ready = backend_status == "connected";

    let response = json!({
        "ready": overall_ready,
        "service": "controladoria-juridica",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "dependencies": {
            "backend": {
                "status": backend_status,
                "api_url": state.settings.backend.api_url
            }
        }
    });

    if overall_ready {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

pub async fn status_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let backend_configured = !state.settings.backend.api_url.is_empty()
        && !state.settings.backend.api_key.is_empty();

    let auditoria_habilitada = state
        .settings
        .auditoria
        .as_ref()
        .map_or(true, |a| a.habilitada);

    Json(json!({
        "service": "controladoria-juridica",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
        "integrations": {
            "backend": {
                "configured": backend_configured,
                "api_url": state.settings.backend.api_url,
                "key_configured": !state.settings.backend.api_key.is_empty()
            },
            "auditoria": {
                "habilitada": auditoria_habilitada
            }
        }
    }))
}
