// ==========================================
// 码头配送整合系统 - 引擎层
// ==========================================
// 职责: 业务规则引擎集合
// 分层: 地址解析 / 优先分级 / 车辆估算 / 区域分桶 → 整合编排
// ==========================================

// 地址解析引擎
pub mod address_resolver;

// 优先分级引擎
pub mod classifier;

// 整合引擎 (编排器)
pub mod consolidation;

// 发运交接边界
pub mod dispatch;

// 引擎错误类型
pub mod error;

// 区域分桶引擎
pub mod region_bucketer;

// 文本归一化
pub(crate) mod text;

// 车辆估算引擎
pub mod vehicle_sizing;

// ==========================================
// 重导出核心类型
// ==========================================

pub use address_resolver::AddressResolver;
pub use classifier::PriorityClassifier;
pub use consolidation::ConsolidationEngine;
pub use dispatch::{DispatchAdapter, LoggingDispatchAdapter, RecordingDispatchAdapter};
pub use error::{EngineError, EngineResult};
pub use region_bucketer::{RegionBucket, RegionBucketer};
pub use vehicle_sizing::VehicleSizingEstimator;
