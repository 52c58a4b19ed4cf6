use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{AtualizacaoCaso, Caso, Estagio, NovoCaso, StatusCaso};
use crate::services::EventoSistema;
use crate::utils::logging::*;
use crate::utils::AppError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FiltroCasos {
    pub status: Option<StatusCaso>,
}

/// GET /casos
pub async fn listar_casos(
    State(state): State<Arc<AppState>>,
    Query(filtro): Query<FiltroCasos>,
) -> Result<Json<Vec<Caso>>, AppError> {
    log_request_received("/casos", "GET");
    let casos = state.casos.listar(filtro.status).await?;
    Ok(Json(casos))
}

/// GET /casos/{id}
pub async fn buscar_caso(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Caso>, AppError> {
    let caso = state.casos.buscar(id).await?;
    Ok(Json(caso))
}

/// POST /casos — caminho canônico de entrada de um caso novo
pub async fn criar_caso(
    State(state): State<Arc<AppState>>,
    Json(entrada): Json<NovoCaso>,
) -> Result<(StatusCode, Json<Caso>), AppError> {
    log_request_received("/casos", "POST");

    let criado = state.casos.criar(&entrada).await.map_err(|e| {
        log_validation_error("novo_caso", &e.to_string());
        AppError::from(e)
    })?;

    state.eventos.publicar(EventoSistema::CasoCriado {
        caso_id: criado.id,
        numero_hon: criado.numero_hon.clone(),
    });

    Ok((StatusCode::CREATED, Json(criado)))
}

/// PUT /casos/{id} — campos editáveis fora do ciclo de vida
pub async fn atualizar_caso(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(mudancas): Json<AtualizacaoCaso>,
) -> Result<Json<Caso>, AppError> {
    log_request_received("/casos/{id}", "PUT");
    let atualizado = state.casos.atualizar(id, &mudancas).await?;
    Ok(Json(atualizado))
}

/// POST /casos/{id}/transicao — única porta de mudança de status
pub async fn transicionar_caso(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(estagio): Json<Estagio>,
) -> Result<Json<Caso>, AppError> {
    log_request_received("/casos/{id}/transicao", "POST");

    let anterior = state.casos.buscar(id).await?;
    let persistido = state.casos.transicionar(id, estagio).await?;

    state.eventos.publicar(EventoSistema::StatusAlterado {
        caso_id: id,
        de: anterior.status,
        para: persistido.status,
    });

    Ok(Json(persistido))
}

/// DELETE /admin/casos/{id} — remoção destrutiva, atrás do gate de admin
pub async fn remover_caso(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    log_request_received("/admin/casos/{id}", "DELETE");

    // 404 antes de remover: o DELETE filtrado do backend é silencioso
    // para linhas inexistentes
    state.casos.buscar(id).await?;
    state.casos.remover(id).await?;

    state
        .eventos
        .publicar(EventoSistema::CasoRemovido { caso_id: id });

    Ok(Json(json!({
        "status": "success",
        "removed": id
    })))
}
