use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub cors: Option<CorsSettings>,
    pub auditoria: Option<AuditoriaSettings>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Backend hospedado (tabelas relacionais + storage) consumido via REST
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendSettings {
    pub api_url: String,
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    pub tabela_casos: Option<String>,       // padrão: "casos"
    pub tabela_documentos: Option<String>,  // padrão: "documentos"
    pub tabela_auditoria: Option<String>,   // padrão: "auditoria"
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorsSettings {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditoriaSettings {
    pub habilitada: bool,
}

fn default_timeout() -> u64 {
    30
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente específicas do backend hospedado
        if let Ok(url) = std::env::var("BACKEND_API_URL") {
            builder = builder.set_override("backend.api_url", url)?;
        }
        if let Ok(key) = std::env::var("BACKEND_API_KEY") {
            builder = builder.set_override("backend.api_key", key)?;
        }

        builder = builder.add_source(Environment::with_prefix("CONTROLADORIA").separator("__"));

        let s = builder.build()?;

        s.try_deserialize()
    }
}
