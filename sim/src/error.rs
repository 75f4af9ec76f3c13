use perp_engine::PerpError;
use perp_interfaces::ChainError;
use perp_types::ParamsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Parse(String),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Engine(#[from] PerpError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}
