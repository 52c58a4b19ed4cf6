use axum::{extract::State, response::Json};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;

use crate::services::metricas::{agregar, DashboardMetrics};
use crate::utils::logging::*;
use crate::utils::AppError;
use crate::AppState;

/// GET /dashboard/metricas
///
/// Busca a fotografia completa da tabela de casos e agrega em memória.
/// A agregação nunca roda sobre dados parciais: falha de busca interrompe
/// a requisição antes de qualquer cálculo.
pub async fn obter_metricas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardMetrics>, AppError> {
    let inicio = Instant::now();
    log_request_received("/dashboard/metricas", "GET");

    let casos = state.casos.listar(None).await?;
    let metricas = agregar(&casos, Utc::now());

    log_metricas_calculadas(casos.len(), inicio.elapsed().as_millis() as u64);
    Ok(Json(metricas))
}
