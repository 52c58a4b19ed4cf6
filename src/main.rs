/// Backend da controladoria jurídica
///
/// Arquitetura:
/// - Camada fina de API sobre o backend hospedado (tabelas + storage)
/// - Dashboard agrega métricas em memória a partir da tabela de casos
/// - Mudanças de status passam pela máquina de estados do ciclo de vida
/// - Eventos de domínio saem por um barramento explícito; a trilha de
///   auditoria é um assinante
use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Router,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use controladoria_juridica::{
    config::settings::CorsSettings, config::Settings, handlers::*,
    middleware as app_middleware, services, utils::logging::*, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Carregar variáveis de ambiente do arquivo .env (se existir)
    if dotenvy::dotenv().is_err() {
        // Em produção não existe .env - variáveis vêm do ambiente
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    // Inicializar tracing
    tracing_subscriber::fmt::init();

    // Carregar configurações
    let settings = Settings::new().context("Failed to load settings")?;

    log_config_loaded(&std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()));

    // Cliente do backend hospedado e serviços de domínio
    let backend_client = services::BackendClient::new(&settings.backend)
        .context("Failed to create backend client")?;

    let casos = services::CasosService::new(
        backend_client.clone(),
        settings.backend.tabela_casos.clone(),
    );
    let documentos = services::DocumentosService::new(
        backend_client.clone(),
        settings.backend.tabela_documentos.clone(),
    );
    let auditoria = services::AuditoriaService::new(
        backend_client,
        settings.backend.tabela_auditoria.clone(),
    );

    // Barramento de eventos: handle explícito no AppState, assinaturas
    // feitas aqui no startup
    let eventos = services::BarramentoEventos::default();

    let auditoria_habilitada = settings
        .auditoria
        .as_ref()
        .map_or(true, |a| a.habilitada);

    if auditoria_habilitada {
        tokio::spawn(services::auditoria::consumir_eventos(
            eventos.inscrever(),
            auditoria.clone(),
        ));
        log_info("Consumidor de auditoria inscrito no barramento de eventos");
    } else {
        log_warning("Trilha de auditoria desabilitada por configuração");
    }

    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        casos,
        documentos,
        auditoria,
        eventos,
    });

    // Rotas públicas da aplicação
    let mut app = Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/status", get(status_check))

        // Dashboard
        .route("/dashboard/metricas", get(obter_metricas))

        // Casos: CRUD, ciclo de vida e quadro
        .route("/casos", get(listar_casos).post(criar_caso))
        .route("/casos/kanban", get(quadro_kanban))
        .route("/casos/:id", get(buscar_caso).put(atualizar_caso))
        .route("/casos/:id/transicao", post(transicionar_caso))
        .route(
            "/casos/:id/documentos",
            get(listar_documentos).post(vincular_documento),
        )
        .with_state(app_state.clone());

    // Rotas administrativas protegidas com API key
    let admin_routes = Router::new()
        .route("/admin/auditoria", get(listar_auditoria))
        .route("/admin/casos/:id", delete(remover_caso))
        .layer(middleware::from_fn(app_middleware::require_admin_key))
        .with_state(app_state);

    app = app.merge(admin_routes);

    let app = app
        .layer(cors_layer(settings.cors.as_ref()))
        .layer(TraceLayer::new_for_http());

    // Iniciar servidor; em ambientes gerenciados a porta vem de PORT
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(settings.server.port);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    log_server_startup(port);
    log_server_ready(port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("Server shut down gracefully");
    Ok(())
}

/// CORS para a SPA: origens explícitas quando configuradas, permissivo
/// (com aviso) quando não
fn cors_layer(cors: Option<&CorsSettings>) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .map(|c| {
            c.allowed_origins
                .iter()
                .filter_map(|origem| origem.parse().ok())
                .collect()
        })
        .unwrap_or_default();

    if origins.is_empty() {
        log_warning("CORS sem origens configuradas - permitindo qualquer origem");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("Received SIGTERM, shutting down gracefully...");
        }
    }
}
