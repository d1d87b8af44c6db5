use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Cell index out of range")]
    InvalidIndex,
}

pub type Result<T> = core::result::Result<T, GameError>;
