// ==========================================
// 码头配送整合系统 - 核心库
// ==========================================
// 系统定位: 配送整合与路线决策引擎 (宿主服务最终控制权)
// 技术栈: Rust + serde + tracing
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 仓储层 - 快照持久化边界
pub mod repository;

// 配置层 - 规则参数
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    HandlingTag, PriorityTier, RecordStatus, RegionClass, ResolutionSource, RouteStatus,
    VehicleClass,
};

// 领域实体
pub use domain::{
    ConsolidatedLoad, DeliveryDraft, DeliveryRecord, Destination, LineItem, ManifestLine,
    RawAddress, RouteCandidate, RouteStop, VehicleRequirement,
};

// 引擎
pub use engine::{
    AddressResolver, ConsolidationEngine, DispatchAdapter, LoggingDispatchAdapter,
    PriorityClassifier, RecordingDispatchAdapter, RegionBucket, RegionBucketer,
    VehicleSizingEstimator,
};
pub use engine::error::{EngineError, EngineResult};

// 仓储
pub use repository::{
    EngineSnapshot, InMemorySnapshotRepository, JsonFileSnapshotRepository, SnapshotRepository,
};

// 配置
pub use config::ConsolidationConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "码头配送整合系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
