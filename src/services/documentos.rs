//! GED — vínculos de documentos por caso.
//!
//! O arquivo em si mora no storage do backend hospedado; aqui ficam só as
//! linhas de vínculo (título + URL) na tabela `documentos`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::backend::{BackendClient, BackendError, Result};

const TABELA_PADRAO: &str = "documentos";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Documento {
    pub id: Uuid,
    pub caso_id: Uuid,
    pub titulo: String,
    pub url: String,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovoDocumento {
    pub titulo: String,
    pub url: String,
}

impl NovoDocumento {
    fn validar(&self) -> Result<()> {
        if self.titulo.trim().is_empty() {
            return Err(BackendError::ValidationError(
                "titulo não pode ser vazio".to_string(),
            ));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(BackendError::ValidationError(format!(
                "url inválida: {}",
                self.url
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct DocumentosService {
    client: BackendClient,
    tabela: String,
}

impl DocumentosService {
    pub fn new(client: BackendClient, tabela: Option<String>) -> Self {
        Self {
            client,
            tabela: tabela.unwrap_or_else(|| TABELA_PADRAO.to_string()),
        }
    }

    fn caminho(&self, query: &str) -> String {
        format!("/rest/v1/{}{}", self.tabela, query)
    }

    pub async fn listar_do_caso(&self, caso_id: Uuid) -> Result<Vec<Documento>> {
        let query = format!("?select=*&caso_id=eq.{}&order=criado_em.desc", caso_id);
        self.client.get_json(&self.caminho(&query)).await
    }

    pub async fn vincular(&self, caso_id: Uuid, entrada: &NovoDocumento) -> Result<Documento> {
        entrada.validar()?;

        let registro = Documento {
            id: Uuid::new_v4(),
            caso_id,
            titulo: entrada.titulo.trim().to_string(),
            url: entrada.url.clone(),
            criado_em: Utc::now(),
        };

        let corpo = serde_json::to_value(&registro)?;
        let mut criados: Vec<Documento> = self.client.post_json(&self.caminho(""), &corpo).await?;
        criados.pop().ok_or_else(|| BackendError::ApiError {
            status: 500,
            message: "backend não devolveu o documento criado".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn servico(server: &MockServer) -> DocumentosService {
        let client = BackendClient::from_parts(&server.base_url(), "chave", 5).unwrap();
        DocumentosService::new(client, None)
    }

    #[tokio::test]
    async fn test_vincular_valida_url() {
        let server = MockServer::start_async().await;
        let entrada = NovoDocumento {
            titulo: "Contrato assinado".to_string(),
            url: "ftp://arquivo".to_string(),
        };

        let erro = servico(&server)
            .vincular(Uuid::new_v4(), &entrada)
            .await
            .unwrap_err();
        assert!(matches!(erro, BackendError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_vincular_grava_linha() {
        let server = MockServer::start_async().await;
        let caso_id = Uuid::new_v4();

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/documentos")
                    .json_body_partial(
                        json!({
                            "caso_id": caso_id,
                            "titulo": "Contrato assinado"
                        })
                        .to_string(),
                    );
                then.status(201).json_body(json!([{
                    "id": Uuid::new_v4(),
                    "caso_id": caso_id,
                    "titulo": "Contrato assinado",
                    "url": "https://storage.example.com/contrato.pdf",
                    "criado_em": "2026-08-06T12:00:00Z"
                }]));
            })
            .await;

        let documento = servico(&server)
            .vincular(
                caso_id,
                &NovoDocumento {
                    titulo: "  Contrato assinado  ".to_string(),
                    url: "https://storage.example.com/contrato.pdf".to_string(),
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(documento.caso_id, caso_id);
    }

    #[tokio::test]
    async fn test_listar_filtra_pelo_caso() {
        let server = MockServer::start_async().await;
        let caso_id = Uuid::new_v4();

        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/documentos")
                    .query_param("caso_id", format!("eq.{}", caso_id));
                then.status(200).json_body(json!([]));
            })
            .await;

        let docs = servico(&server).listar_do_caso(caso_id).await.unwrap();
        mock.assert_async().await;
        assert!(docs.is_empty());
    }
}
