use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::services::auditoria::RegistroAuditoria;
use crate::utils::logging::*;
use crate::utils::AppError;
use crate::AppState;

const LIMITE_PADRAO: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct FiltroAuditoria {
    pub limite: Option<usize>,
}

/// GET /admin/auditoria — trilha recente, atrás do gate de admin
pub async fn listar_auditoria(
    State(state): State<Arc<AppState>>,
    Query(filtro): Query<FiltroAuditoria>,
) -> Result<Json<Vec<RegistroAuditoria>>, AppError> {
    log_request_received("/admin/auditoria", "GET");

    let limite = filtro.limite.unwrap_or(LIMITE_PADRAO).min(500);
    let registros = state.auditoria.listar_recentes(limite).await?;
    Ok(Json(registros))
}
