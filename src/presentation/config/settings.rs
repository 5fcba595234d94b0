use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub chunking: ChunkingSettings,
    pub worker: WorkerSettings,
}

impl Settings {
    /// Layered configuration: built-in defaults, then an optional
    /// `config/{environment}.toml` file, then `APP_`-prefixed environment
    /// variables (`APP_SERVER__PORT=8080` overrides `server.port`).
    pub fn load(environment: Environment) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("database.provider", "memory")?
            .set_default("database.url", "postgres://localhost:5432/boardrag")?
            .set_default("database.max_connections", 10_i64)?
            .set_default("storage.provider", "memory")?
            .set_default("storage.local_path", "./blob_storage")?
            .set_default("chunking.max_chunk_size", 1000_i64)?
            .set_default("chunking.overlap", 150_i64)?
            .set_default("chunking.boundary_lookback", 200_i64)?
            .set_default("worker.count", 2_i64)?
            .set_default("worker.max_attempts", 3_i64)?
            .set_default("worker.io_timeout_secs", 30_i64)?
            .set_default("worker.visibility_timeout_secs", 60_i64)?
            .add_source(
                config::File::with_name(&format!("config/{}", environment.as_str()))
                    .required(false),
            )
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub provider: MetadataProvider,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataProvider {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProvider,
    pub local_path: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Memory,
    Local,
}

/// Chunk size, overlap, and boundary lookback are all counted in chars; see
/// the splitter documentation.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingSettings {
    pub max_chunk_size: usize,
    pub overlap: usize,
    pub boundary_lookback: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub count: usize,
    pub max_attempts: u32,
    pub io_timeout_secs: u64,
    pub visibility_timeout_secs: u64,
}
