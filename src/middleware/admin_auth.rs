//! Autenticação dos endpoints administrativos.
//!
//! As rotas /admin/* (trilha de auditoria, remoção de casos) exigem a
//! chave do header `X-Admin-Key`, comparada com a variável de ambiente
//! `ADMIN_API_KEY`. Em desenvolvimento a ausência de chave configurada
//! libera o acesso com aviso; em produção bloqueia.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, PartialEq)]
enum Decisao {
    Permitir,
    PermitirComAviso,
    Recusar,
    SemChaveEmProducao,
}

/// Regra pura de decisão, separada do I/O de env e de request
fn decidir(
    chave_esperada: Option<&str>,
    chave_recebida: Option<&str>,
    em_producao: bool,
) -> Decisao {
    match (chave_esperada, chave_recebida) {
        (Some(esperada), Some(recebida)) if esperada == recebida => Decisao::Permitir,
        (Some(_), _) => Decisao::Recusar,
        (None, _) if em_producao => Decisao::SemChaveEmProducao,
        (None, _) => Decisao::PermitirComAviso,
    }
}

pub async fn require_admin_key(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let chave_recebida = headers.get("X-Admin-Key").and_then(|v| v.to_str().ok());
    let chave_esperada = std::env::var("ADMIN_API_KEY").ok();

    let em_producao = std::env::var("RUST_ENV")
        .unwrap_or_else(|_| "development".to_string())
        == "production";

    match decidir(chave_esperada.as_deref(), chave_recebida, em_producao) {
        Decisao::Permitir => {
            tracing::debug!("Admin access granted");
            Ok(next.run(request).await)
        }
        Decisao::PermitirComAviso => {
            tracing::warn!(
                "ADMIN_API_KEY not configured - allowing access in development mode. \
                 Configure ADMIN_API_KEY in production!"
            );
            Ok(next.run(request).await)
        }
        Decisao::Recusar => {
            tracing::warn!("Admin access denied - invalid or missing X-Admin-Key");
            Err(resposta_nao_autorizado())
        }
        Decisao::SemChaveEmProducao => {
            tracing::error!("ADMIN_API_KEY not configured in production! Blocking admin access.");
            Err(resposta_indisponivel())
        }
    }
}

fn resposta_nao_autorizado() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "Unauthorized",
            "message": "Missing or invalid X-Admin-Key header"
        })),
    )
        .into_response()
}

fn resposta_indisponivel() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": "Service Unavailable",
            "message": "ADMIN_API_KEY not configured on server"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chave_correta_permite() {
        assert_eq!(
            decidir(Some("segredo"), Some("segredo"), true),
            Decisao::Permitir
        );
    }

    #[test]
    fn test_chave_errada_ou_ausente_recusa() {
        assert_eq!(
            decidir(Some("segredo"), Some("outra"), false),
            Decisao::Recusar
        );
        assert_eq!(decidir(Some("segredo"), None, false), Decisao::Recusar);
    }

    #[test]
    fn test_sem_configuracao_depende_do_ambiente() {
        assert_eq!(decidir(None, None, false), Decisao::PermitirComAviso);
        assert_eq!(
            decidir(None, Some("qualquer"), true),
            Decisao::SemChaveEmProducao
        );
    }
}
