// ==========================================
// 码头配送整合系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务不变量
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod delivery;
pub mod destination;
pub mod load;
pub mod route;
pub mod types;
pub mod vehicle;

// 重导出核心类型
pub use delivery::{DeliveryDraft, DeliveryRecord, LineItem, RawAddress};
pub use destination::Destination;
pub use load::{ConsolidatedLoad, ManifestLine};
pub use route::{RouteCandidate, RouteStop};
pub use types::{
    HandlingTag, PriorityTier, RecordStatus, RegionClass, ResolutionSource, RouteStatus,
    VehicleClass,
};
pub use vehicle::VehicleRequirement;
