//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),

    #[error("No upload batch is active")]
    BatchNotActive,

    #[error("Upload batch already complete; use rollback instead of cancel")]
    BatchAlreadyComplete,

    #[error("Upload batch still in progress ({current}/{total})")]
    BatchIncomplete { current: usize, total: usize },

    #[error("Material {0} is missing clientId or name and cannot be inserted")]
    IncompleteMaterial(String),

    #[error("Material {id} belongs to client {expected}, patch targets {got}")]
    ClientMismatch {
        id: String,
        expected: String,
        got: String,
    },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
