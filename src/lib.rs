// Biblioteca do backend da controladoria jurídica
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub casos: services::CasosService,
    pub documentos: services::DocumentosService,
    pub auditoria: services::AuditoriaService,
    pub eventos: services::BarramentoEventos,
}
