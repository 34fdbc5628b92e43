use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("文件未下载完整: {name} (id: {id})")]
    Incomplete {
        name: String,
        id: i64,
    },

    #[error("IO错误: {0}")]
    IoError(#[from] io::Error),

    #[error("CRC32 校验失败: 实际 {actual}, 预期 {expected}")]
    ChecksumMismatch {
        actual: String,
        expected: String,
    },

    #[error("分块布局无效: {0}")]
    InvalidLayout(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("日志初始化失败: {0}")]
    LoggerError(#[from] log::SetLoggerError),
}

impl SyncError {
    /// 调用方可以稍后重试（等待更多分块，或重新读取文件）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Incomplete { .. } |
            SyncError::IoError(_)
        )
    }

    /// 任务本身已不可用，需要丢弃已组装的数据
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::ChecksumMismatch { .. } |
            SyncError::InvalidLayout(_)
        )
    }

    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        SyncError::InvalidLayout(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        SyncError::ConfigError(msg.into())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
