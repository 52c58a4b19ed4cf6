use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::services::documentos::{Documento, NovoDocumento};
use crate::services::EventoSistema;
use crate::utils::logging::*;
use crate::utils::AppError;
use crate::AppState;

/// GET /casos/{id}/documentos
pub async fn listar_documentos(
    State(state): State<Arc<AppState>>,
    Path(caso_id): Path<Uuid>,
) -> Result<Json<Vec<Documento>>, AppError> {
    log_request_received("/casos/{id}/documentos", "GET");
    let documentos = state.documentos.listar_do_caso(caso_id).await?;
    Ok(Json(documentos))
}

/// POST /casos/{id}/documentos — vincula um arquivo já no storage ao caso
pub async fn vincular_documento(
    State(state): State<Arc<AppState>>,
    Path(caso_id): Path<Uuid>,
    Json(entrada): Json<NovoDocumento>,
) -> Result<(StatusCode, Json<Documento>), AppError> {
    log_request_received("/casos/{id}/documentos", "POST");

    // O vínculo só existe para caso existente
    state.casos.buscar(caso_id).await?;

    let documento = state.documentos.vincular(caso_id, &entrada).await?;

    state.eventos.publicar(EventoSistema::DocumentoVinculado {
        caso_id,
        documento_id: documento.id,
    });

    Ok((StatusCode::CREATED, Json(documento)))
}
