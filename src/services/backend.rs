//! Cliente HTTP para a API REST de tabelas do backend hospedado.
//!
//! O backend expõe as tabelas relacionais (`casos`, `documentos`,
//! `auditoria`) em endpoints REST com filtros por query string. Este
//! cliente concentra autenticação, timeouts e o mapeamento uniforme de
//! status de erro; os serviços de domínio montam os caminhos.

use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::BackendSettings;

/// Erros do cliente do backend hospedado
#[derive(Debug, Error)]
pub enum BackendError {
    /// Erro de requisição HTTP
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Erro da API do backend (status code não-2xx)
    #[error("Backend API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Recurso não encontrado (caso, documento, etc)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erro de configuração
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Erro de validação
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Tipo Result padrão da camada de acesso a dados
pub type Result<T> = std::result::Result<T, BackendError>;

/// Cliente autenticado para a API de tabelas do backend
#[derive(Clone)]
pub struct BackendClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl BackendClient {
    /// Cria o cliente a partir das configurações do serviço.
    ///
    /// Timeout total vem de `backend.timeout_seconds`; connect fixo em 5s.
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        Self::from_parts(&settings.api_url, &settings.api_key, settings.timeout_seconds)
    }

    /// Construção direta, usada pelos testes com servidor local
    pub fn from_parts(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| BackendError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET com parse de JSON
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.json().await?)
    }

    /// POST com corpo JSON; o backend devolve a representação criada
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.json().await?)
    }

    /// PATCH parcial filtrado por query string
    pub async fn patch_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("PATCH {}", url);

        let response = self
            .http_client
            .patch(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.json().await?)
    }

    /// DELETE filtrado por query string
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("DELETE {}", url);

        let response = self
            .http_client
            .delete(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        self.handle_response(response).await?;
        Ok(())
    }

    /// Processa a resposta HTTP e converte status de erro
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let error_body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!("Backend API error ({}): {}", status_code, error_body);

        // Tentar extrair mensagem de erro do JSON
        let message = if let Ok(json) = serde_json::from_str::<Value>(&error_body) {
            json.get("message")
                .or_else(|| json.get("error"))
                .or_else(|| json.get("hint"))
                .and_then(|v| v.as_str())
                .unwrap_or(&error_body)
                .to_string()
        } else {
            error_body
        };

        if status_code == 404 {
            return Err(BackendError::NotFound(message));
        }

        Err(BackendError::ApiError {
            status: status_code,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_get_json_envia_credenciais() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/casos")
                    .header("apikey", "chave-teste")
                    .header("Authorization", "Bearer chave-teste");
                then.status(200).json_body(serde_json::json!([]));
            })
            .await;

        let client = BackendClient::from_parts(&server.base_url(), "chave-teste", 5).unwrap();
        let linhas: Vec<Value> = client.get_json("/rest/v1/casos").await.unwrap();

        mock.assert_async().await;
        assert!(linhas.is_empty());
    }

    #[tokio::test]
    async fn test_erro_da_api_extrai_mensagem() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/casos");
                then.status(500)
                    .json_body(serde_json::json!({ "message": "conexão recusada" }));
            })
            .await;

        let client = BackendClient::from_parts(&server.base_url(), "k", 5).unwrap();
        let erro = client
            .get_json::<Vec<Value>>("/rest/v1/casos")
            .await
            .unwrap_err();

        match erro {
            BackendError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "conexão recusada");
            }
            outro => panic!("esperava ApiError, veio {:?}", outro),
        }
    }

    #[tokio::test]
    async fn test_404_vira_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/inexistente");
                then.status(404).body("tabela não existe");
            })
            .await;

        let client = BackendClient::from_parts(&server.base_url(), "k", 5).unwrap();
        let erro = client
            .get_json::<Vec<Value>>("/rest/v1/inexistente")
            .await
            .unwrap_err();

        assert!(matches!(erro, BackendError::NotFound(_)));
    }

    #[test]
    fn test_base_url_normalizada_sem_barra_final() {
        let client = BackendClient::from_parts("https://backend.example.com/", "k", 5).unwrap();
        assert_eq!(client.base_url(), "https://backend.example.com");
    }
}
