//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 数据报解码失败
    #[error("failed to decode state sample from {source_id}: {message}")]
    DecodeFailed {
        /// 数据源 ID
        source_id: String,
        /// 错误消息
        message: String,
    },

    /// 采样编码失败
    #[error("failed to encode state sample: {message}")]
    EncodeFailed {
        /// 错误消息
        message: String,
    },

    /// 姿态表示与部署配置不一致
    #[error("source {source_id} sent {found} orientation, expected {expected}")]
    RepresentationMismatch {
        /// 数据源 ID
        source_id: String,
        /// 期望的表示
        expected: String,
        /// 实际的表示
        found: String,
    },

    /// 无法绑定 socket
    #[error("source {source_id} failed to bind {addr}: {message}")]
    BindFailed {
        /// 数据源 ID
        source_id: String,
        /// 绑定地址
        addr: String,
        /// 错误消息
        message: String,
    },

    /// 通道已关闭
    #[error("channel closed for source {source_id}")]
    ChannelClosed {
        /// 数据源 ID
        source_id: String,
    },
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::DecodeFailed { source_id, message } => {
                ContractError::SampleDecode { source_id, message }
            }
            IngestionError::EncodeFailed { message } => ContractError::Other(message),
            IngestionError::RepresentationMismatch {
                source_id,
                expected,
                found,
            } => ContractError::RepresentationMismatch {
                source_id,
                expected,
                found,
            },
            IngestionError::BindFailed {
                source_id,
                addr,
                message,
            } => ContractError::SourceUnavailable {
                source_id,
                message: format!("bind {addr}: {message}"),
            },
            IngestionError::ChannelClosed { source_id } => {
                ContractError::SourceUnavailable {
                    source_id,
                    message: "channel closed".to_string(),
                }
            }
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
