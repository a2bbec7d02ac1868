use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File error: '{0}'")]
    Io(#[from] std::io::Error),
    #[error("Json error: '{0}'")]
    Json(#[from] serde_json::Error),
    #[error("Database error: '{0}'")]
    Database(#[from] mongodb::error::Error),
    #[error("Could not convert vacancy to a document: '{0}'")]
    Bson(#[from] mongodb::bson::ser::Error),
    #[error("Ssh error: '{0}'")]
    Ssh(#[from] ssh2::Error),
    #[error("Ssh authentication failed for user '{0}'")]
    SshAuth(String),
    #[error("Tunnel task failed: '{0}'")]
    Join(#[from] tokio::task::JoinError),
    #[error("Missing environment variable: '{0}'")]
    MissingVar(&'static str),
    #[error("Invalid value for '{0}': '{1}'")]
    InvalidVar(&'static str, String),
    #[error("No database configured")]
    NoDatabase,
}
