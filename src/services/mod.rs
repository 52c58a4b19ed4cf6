pub mod auditoria;
pub mod backend;
pub mod casos;
pub mod documentos;
pub mod metricas;
pub mod notificacoes;

pub use auditoria::AuditoriaService;
pub use backend::BackendClient;
pub use casos::CasosService;
pub use documentos::DocumentosService;
pub use metricas::{agregar, DashboardMetrics};
pub use notificacoes::{BarramentoEventos, EventoSistema};
