use tracing::{info, warn, error, debug};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_request_processed(endpoint: &str, status: u16, duration_ms: u64) {
    info!("Request processed: {} - Status: {} - Duration: {}ms",
          endpoint, status, duration_ms);
}

pub fn log_caso_criado(caso_id: &str, numero_hon: &str) {
    info!("Caso criado com sucesso: {} - HON: {}", caso_id, numero_hon);
}

pub fn log_caso_atualizado(caso_id: &str) {
    info!("Caso atualizado: {}", caso_id);
}

pub fn log_transicao_status(caso_id: &str, de: &str, para: &str) {
    info!("Transição de status do caso {}: {} -> {}", caso_id, de, para);
}

pub fn log_backend_api_error(endpoint: &str, status: Option<u16>, error: &str) {
    error!("Backend API error: {} - Status: {:?} - Error: {}", endpoint, status, error);
}

pub fn log_metricas_calculadas(total_casos: usize, duration_ms: u64) {
    info!("Métricas do dashboard calculadas sobre {} casos em {}ms", total_casos, duration_ms);
}

pub fn log_auditoria_registrada(acao: &str, caso_id: Option<&str>) {
    debug!("Evento de auditoria registrado: {} - Caso: {:?}", acao, caso_id);
}

pub fn log_auditoria_falhou(acao: &str, error: &str) {
    warn!("Falha ao registrar auditoria (evento descartado): {} - {}", acao, error);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("Controladoria jurídica server starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
