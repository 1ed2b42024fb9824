//! 服务器生命周期错误
//!
//! 请求级别的错误走 `shared::AppError`，这里只覆盖启动和关停阶段。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("initialization failed: {0}")]
    Init(#[from] shared::AppError),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
