// ==========================================
// 码头配送整合系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use std::path::PathBuf;

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    // ===== IO 错误 =====
    #[error("快照文件读写失败 (path={path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===== 序列化错误 =====
    #[error("快照序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;
