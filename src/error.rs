use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree error: {0}")]
    Tree(#[from] crate::tree::TreeError),

    #[error("Loadout error: {0}")]
    Loadout(#[from] crate::loadout::DecodeError),

    #[error("No tree for spec {0}")]
    SpecNotFound(u32),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
