use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use contracts::domain::common::EntityKind;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SheetsBackend {
    Google,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SheetsConfig {
    pub backend: SheetsBackend,
    pub spreadsheet_id: String,
    pub api_base_url: String,
    /// OAuth bearer token; `JF_SHEETS_ACCESS_TOKEN` takes precedence
    pub access_token: String,
    pub header_cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            backend: SheetsBackend::Google,
            spreadsheet_id: String::new(),
            api_base_url: "https://sheets.googleapis.com/v4".to_string(),
            access_token: String::new(),
            header_cache_ttl_secs: 300,
            request_timeout_secs: 30,
        }
    }
}

impl SheetsConfig {
    pub fn resolved_access_token(&self) -> String {
        std::env::var("JF_SHEETS_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.access_token.clone())
    }

    pub fn header_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.header_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MigrationConfig {
    /// Wait before re-reading formula columns after a survey row is written
    pub read_back_delay_secs: u64,
    pub sheet_names: SheetNames,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            read_back_delay_secs: 5,
            sheet_names: SheetNames::default(),
        }
    }
}

impl MigrationConfig {
    pub fn read_back_delay(&self) -> Duration {
        Duration::from_secs(self.read_back_delay_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SheetNames {
    pub financial_surveys: String,
    pub payroll: String,
    pub loans: String,
    pub write_offs: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            financial_surveys: "Financial Surveys".to_string(),
            payroll: "Payroll".to_string(),
            loans: "Loans".to_string(),
            write_offs: "Write-offs".to_string(),
        }
    }
}

impl SheetNames {
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::FinancialSurvey => &self.financial_surveys,
            EntityKind::Payroll => &self.payroll,
            EntityKind::Loan => &self.loans,
            EntityKind::WriteOff => &self.write_offs,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/jf.db"

[server]
port = 3000

[sheets]
backend = "google"
spreadsheet_id = ""
header_cache_ttl_secs = 300

[migration]
read_back_delay_secs = 5
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved_path = exe_dir.join(db_path);
            return Ok(resolved_path);
        }
    }

    Ok(PathBuf::from(db_path_str))
}
