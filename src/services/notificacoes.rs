//! Barramento de eventos do serviço.
//!
//! Notificações de domínio saem dos handlers por um handle explícito de
//! publicação/assinatura carregado no `AppState`, em vez de referências
//! globais mutáveis. Quem quiser reagir (auditoria, futuros consumidores)
//! se inscreve no startup; publicar sem assinantes é um no-op.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::caso::StatusCaso;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum EventoSistema {
    CasoCriado {
        caso_id: Uuid,
        numero_hon: String,
    },
    StatusAlterado {
        caso_id: Uuid,
        de: StatusCaso,
        para: StatusCaso,
    },
    CasoRemovido {
        caso_id: Uuid,
    },
    DocumentoVinculado {
        caso_id: Uuid,
        documento_id: Uuid,
    },
}

impl EventoSistema {
    /// Nome da ação para a trilha de auditoria
    pub fn acao(&self) -> &'static str {
        match self {
            EventoSistema::CasoCriado { .. } => "caso_criado",
            EventoSistema::StatusAlterado { .. } => "status_alterado",
            EventoSistema::CasoRemovido { .. } => "caso_removido",
            EventoSistema::DocumentoVinculado { .. } => "documento_vinculado",
        }
    }

    pub fn caso_id(&self) -> Uuid {
        match self {
            EventoSistema::CasoCriado { caso_id, .. }
            | EventoSistema::StatusAlterado { caso_id, .. }
            | EventoSistema::CasoRemovido { caso_id }
            | EventoSistema::DocumentoVinculado { caso_id, .. } => *caso_id,
        }
    }
}

#[derive(Clone)]
pub struct BarramentoEventos {
    tx: broadcast::Sender<EventoSistema>,
}

impl BarramentoEventos {
    pub fn new(capacidade: usize) -> Self {
        let (tx, _) = broadcast::channel(capacidade);
        Self { tx }
    }

    /// Publica para todos os assinantes ativos. Sem assinantes o evento é
    /// simplesmente descartado — nunca é erro do caminho que publicou.
    pub fn publicar(&self, evento: EventoSistema) {
        match self.tx.send(evento) {
            Ok(entregues) => {
                tracing::debug!("Evento publicado para {} assinante(s)", entregues);
            }
            Err(_) => {
                tracing::debug!("Evento publicado sem assinantes, descartado");
            }
        }
    }

    pub fn inscrever(&self) -> broadcast::Receiver<EventoSistema> {
        self.tx.subscribe()
    }
}

impl Default for BarramentoEventos {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publicar_sem_assinantes_nao_falha() {
        let bus = BarramentoEventos::new(8);
        bus.publicar(EventoSistema::CasoRemovido {
            caso_id: Uuid::new_v4(),
        });
    }

    #[tokio::test]
    async fn test_assinante_recebe_evento() {
        let bus = BarramentoEventos::new(8);
        let mut rx = bus.inscrever();

        let caso_id = Uuid::new_v4();
        bus.publicar(EventoSistema::CasoCriado {
            caso_id,
            numero_hon: "HON-0001/2026".to_string(),
        });

        let evento = rx.recv().await.unwrap();
        assert_eq!(evento.acao(), "caso_criado");
        assert_eq!(evento.caso_id(), caso_id);
    }

    #[tokio::test]
    async fn test_todos_os_assinantes_recebem() {
        let bus = BarramentoEventos::new(8);
        let mut rx1 = bus.inscrever();
        let mut rx2 = bus.inscrever();

        let caso_id = Uuid::new_v4();
        bus.publicar(EventoSistema::StatusAlterado {
            caso_id,
            de: StatusCaso::SobAnalise,
            para: StatusCaso::PropostaEnviada,
        });

        assert_eq!(rx1.recv().await.unwrap().caso_id(), caso_id);
        assert_eq!(rx2.recv().await.unwrap().caso_id(), caso_id);
    }
}
