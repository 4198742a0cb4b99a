mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    LocalSettings, LoggingSettings, RemoteSettings, ServerSettings, Settings, StorageSettings,
    TranscriptionSettings,
};
