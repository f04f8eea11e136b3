// ==========================================
// 码头配送整合系统 - 仓储层
// ==========================================
// 职责: 引擎状态快照的持久化边界
// ==========================================

// 仓储错误类型
pub mod error;

// 快照仓储
pub mod snapshot;

// ==========================================
// 重导出核心类型
// ==========================================

pub use error::{StoreError, StoreResult};
pub use snapshot::{
    EngineSnapshot, InMemorySnapshotRepository, JsonFileSnapshotRepository, SnapshotRepository,
};
