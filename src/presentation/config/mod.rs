mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChunkingSettings, DatabaseSettings, MetadataProvider, ServerSettings, Settings,
    StorageProvider, StorageSettings, WorkerSettings,
};
