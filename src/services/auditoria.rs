//! Trilha de auditoria sobre a tabela `auditoria` do backend.
//!
//! O serviço assina o barramento de eventos no startup e grava uma linha
//! por evento. Escrita é melhor-esforço: falha vira log de aviso e o
//! evento é descartado, nunca propaga para a requisição de origem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::services::backend::{BackendClient, Result};
use crate::services::notificacoes::EventoSistema;
use crate::utils::logging::*;

const TABELA_PADRAO: &str = "auditoria";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistroAuditoria {
    pub id: Uuid,
    pub acao: String,
    pub caso_id: Option<Uuid>,
    #[serde(default)]
    pub detalhes: Value,
    pub criado_em: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuditoriaService {
    client: BackendClient,
    tabela: String,
}

impl AuditoriaService {
    pub fn new(client: BackendClient, tabela: Option<String>) -> Self {
        Self {
            client,
            tabela: tabela.unwrap_or_else(|| TABELA_PADRAO.to_string()),
        }
    }

    fn caminho(&self, query: &str) -> String {
        format!("/rest/v1/{}{}", self.tabela, query)
    }

    pub async fn registrar(&self, evento: &EventoSistema) -> Result<()> {
        let registro = RegistroAuditoria {
            id: Uuid::new_v4(),
            acao: evento.acao().to_string(),
            caso_id: Some(evento.caso_id()),
            detalhes: serde_json::to_value(evento)?,
            criado_em: Utc::now(),
        };

        let corpo = serde_json::to_value(&registro)?;
        let _: Vec<RegistroAuditoria> = self.client.post_json(&self.caminho(""), &corpo).await?;

        log_auditoria_registrada(&registro.acao, registro.caso_id.map(|id| id.to_string()).as_deref());
        Ok(())
    }

    pub async fn listar_recentes(&self, limite: usize) -> Result<Vec<RegistroAuditoria>> {
        let query = format!("?select=*&order=criado_em.desc&limit={}", limite);
        self.client.get_json(&self.caminho(&query)).await
    }
}

/// Laço consumidor do barramento; roda em uma task própria até o
/// barramento fechar.
pub async fn consumir_eventos(
    mut rx: broadcast::Receiver<EventoSistema>,
    servico: AuditoriaService,
) {
    loop {
        match rx.recv().await {
            Ok(evento) => {
                let acao = evento.acao();
                if let Err(e) = servico.registrar(&evento).await {
                    log_auditoria_falhou(acao, &e.to_string());
                }
            }
            Err(broadcast::error::RecvError::Lagged(perdidos)) => {
                log_warning(&format!(
                    "Consumidor de auditoria atrasado, {} evento(s) perdido(s)",
                    perdidos
                ));
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notificacoes::BarramentoEventos;
    use httpmock::prelude::*;
    use serde_json::json;

    fn servico(server: &MockServer) -> AuditoriaService {
        let client = BackendClient::from_parts(&server.base_url(), "chave", 5).unwrap();
        AuditoriaService::new(client, None)
    }

    #[tokio::test]
    async fn test_registrar_grava_linha_com_acao_e_detalhes() {
        let server = MockServer::start_async().await;
        let caso_id = Uuid::new_v4();

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/auditoria")
                    .json_body_partial(
                        json!({
                            "acao": "caso_criado",
                            "caso_id": caso_id,
                            "detalhes": { "tipo": "caso_criado", "numero_hon": "HON-0001/2026" }
                        })
                        .to_string(),
                    );
                then.status(201).json_body(json!([{
                    "id": Uuid::new_v4(),
                    "acao": "caso_criado",
                    "caso_id": caso_id,
                    "detalhes": {},
                    "criado_em": "2026-08-06T12:00:00Z"
                }]));
            })
            .await;

        servico(&server)
            .registrar(&EventoSistema::CasoCriado {
                caso_id,
                numero_hon: "HON-0001/2026".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_consumidor_persiste_eventos_publicados() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/auditoria");
                then.status(201).json_body(json!([{
                    "id": Uuid::new_v4(),
                    "acao": "caso_removido",
                    "caso_id": Uuid::new_v4(),
                    "detalhes": {},
                    "criado_em": "2026-08-06T12:00:00Z"
                }]));
            })
            .await;

        let bus = BarramentoEventos::new(8);
        let rx = bus.inscrever();
        let consumidor = tokio::spawn(consumir_eventos(rx, servico(&server)));

        bus.publicar(EventoSistema::CasoRemovido {
            caso_id: Uuid::new_v4(),
        });

        // Derrubar o barramento encerra o laço depois de drenar a fila
        drop(bus);
        consumidor.await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_listar_recentes_usa_limite() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/auditoria")
                    .query_param("limit", "10")
                    .query_param("order", "criado_em.desc");
                then.status(200).json_body(json!([]));
            })
            .await;

        let registros = servico(&server).listar_recentes(10).await.unwrap();
        mock.assert_async().await;
        assert!(registros.is_empty());
    }
}
