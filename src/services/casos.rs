//! Acesso a dados da tabela `casos` do backend hospedado.
//!
//! Toda mudança de status passa pela máquina de estados de
//! [`crate::models::lifecycle`]; o serviço nunca grava uma aresta que a
//! validação recusou.

use chrono::Utc;
use serde_json::Value;

use crate::models::caso::{AtualizacaoCaso, Caso, StatusCaso};
use crate::models::lifecycle::{aplicar_transicao, Estagio, NovoCaso};
use crate::services::backend::{BackendClient, BackendError, Result};
use crate::utils::logging::*;

const TABELA_PADRAO: &str = "casos";

#[derive(Clone)]
pub struct CasosService {
    client: BackendClient,
    tabela: String,
}

impl CasosService {
    pub fn new(client: BackendClient, tabela: Option<String>) -> Self {
        Self {
            client,
            tabela: tabela.unwrap_or_else(|| TABELA_PADRAO.to_string()),
        }
    }

    fn caminho(&self, query: &str) -> String {
        format!("/rest/v1/{}{}", self.tabela, query)
    }

    /// Lista os casos, opcionalmente filtrados por status, mais novos antes
    pub async fn listar(&self, status: Option<StatusCaso>) -> Result<Vec<Caso>> {
        let query = match status {
            Some(s) => format!("?select=*&status=eq.{}&order=criado_em.desc", s),
            None => "?select=*&order=criado_em.desc".to_string(),
        };
        self.client.get_json(&self.caminho(&query)).await
    }

    /// Sonda barata de conectividade para o readiness check
    pub async fn ping(&self) -> Result<()> {
        let _: Vec<Value> = self
            .client
            .get_json(&self.caminho("?select=id&limit=1"))
            .await?;
        Ok(())
    }

    pub async fn buscar(&self, id: uuid::Uuid) -> Result<Caso> {
        let query = format!("?select=*&id=eq.{}", id);
        let mut linhas: Vec<Caso> = self.client.get_json(&self.caminho(&query)).await?;
        linhas
            .pop()
            .ok_or_else(|| BackendError::NotFound(format!("caso {}", id)))
    }

    /// Cria um caso pelo caminho canônico de entrada (validação incluída)
    pub async fn criar(&self, entrada: &NovoCaso) -> Result<Caso> {
        let registro = entrada
            .em_registro(Utc::now())
            .map_err(|e| BackendError::ValidationError(e.to_string()))?;

        let corpo = serde_json::to_value(&registro)?;
        let mut criados: Vec<Caso> = self.client.post_json(&self.caminho(""), &corpo).await?;
        let criado = criados
            .pop()
            .ok_or_else(|| BackendError::ApiError {
                status: 500,
                message: "backend não devolveu a linha criada".to_string(),
            })?;

        log_caso_criado(&criado.id.to_string(), &criado.numero_hon);
        Ok(criado)
    }

    /// Atualiza campos editáveis que não participam do ciclo de vida
    pub async fn atualizar(&self, id: uuid::Uuid, mudancas: &AtualizacaoCaso) -> Result<Caso> {
        if mudancas.vazia() {
            return Err(BackendError::ValidationError(
                "nenhum campo para atualizar".to_string(),
            ));
        }

        let corpo = serde_json::to_value(mudancas)?;
        let query = format!("?id=eq.{}", id);
        let mut linhas: Vec<Caso> = self.client.patch_json(&self.caminho(&query), &corpo).await?;
        let atualizado = linhas
            .pop()
            .ok_or_else(|| BackendError::NotFound(format!("caso {}", id)))?;

        log_caso_atualizado(&id.to_string());
        Ok(atualizado)
    }

    /// Aplica uma transição de ciclo de vida e persiste a linha carimbada.
    ///
    /// A aresta é validada em memória sobre o estado atual do backend;
    /// uma transição recusada nunca chega à rede.
    pub async fn transicionar(&self, id: uuid::Uuid, estagio: Estagio) -> Result<Caso> {
        let mut caso = self.buscar(id).await?;
        let status_anterior = caso.status;

        aplicar_transicao(&mut caso, estagio)
            .map_err(|e| BackendError::ValidationError(e.to_string()))?;

        let mut corpo = serde_json::to_value(&caso)?;
        if let Value::Object(ref mut campos) = corpo {
            // id e criado_em são imutáveis; o filtro da query já aponta a linha
            campos.remove("id");
            campos.remove("criado_em");
        }

        let query = format!("?id=eq.{}", id);
        let mut linhas: Vec<Caso> = self.client.patch_json(&self.caminho(&query), &corpo).await?;
        let persistido = linhas
            .pop()
            .ok_or_else(|| BackendError::NotFound(format!("caso {}", id)))?;

        log_transicao_status(
            &id.to_string(),
            &status_anterior.to_string(),
            &persistido.status.to_string(),
        );
        Ok(persistido)
    }

    pub async fn remover(&self, id: uuid::Uuid) -> Result<()> {
        let query = format!("?id=eq.{}", id);
        self.client.delete(&self.caminho(&query)).await
    }
}
