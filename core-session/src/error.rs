use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Session already shut down")]
    ShutDown,
}

pub type Result<T> = std::result::Result<T, SessionError>;
