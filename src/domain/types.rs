// ==========================================
// 码头配送整合系统 - 领域类型定义
// ==========================================
// 红线: 等级制比较必须全序 (Normal < High < Urgent)
// 序列化格式: SCREAMING_SNAKE_CASE (与外部存储一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 优先等级 (Priority Tier)
// ==========================================
// 红线: 规则只抬升等级,从不降低
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityTier {
    Normal, // 常规
    High,   // 优先
    Urgent, // 紧急
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityTier::Normal => write!(f, "NORMAL"),
            PriorityTier::High => write!(f, "HIGH"),
            PriorityTier::Urgent => write!(f, "URGENT"),
        }
    }
}

impl PriorityTier {
    /// 从字符串解析优先等级
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "URGENT" => PriorityTier::Urgent,
            "HIGH" => PriorityTier::High,
            _ => PriorityTier::Normal, // 默认值
        }
    }

    /// 转换为外部存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PriorityTier::Normal => "NORMAL",
            PriorityTier::High => "HIGH",
            PriorityTier::Urgent => "URGENT",
        }
    }
}

// ==========================================
// 配送单状态 (Record Status)
// ==========================================
// 装车/完成状态由外部装载子系统管理,不在引擎内
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending, // 待整合
    Routed,  // 已入路线
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Pending => write!(f, "PENDING"),
            RecordStatus::Routed => write!(f, "ROUTED"),
        }
    }
}

// ==========================================
// 路线状态 (Route Status)
// ==========================================
// 状态机: CANDIDATE → PENDING_APPROVAL → APPROVED → DISPATCHED
//         CANDIDATE → PENDING_APPROVAL → REJECTED (终态,候选废弃)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Candidate,       // 候选
    PendingApproval, // 待审批
    Approved,        // 已批准
    Dispatched,      // 已发运
    Rejected,        // 已驳回
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteStatus::Candidate => write!(f, "CANDIDATE"),
            RouteStatus::PendingApproval => write!(f, "PENDING_APPROVAL"),
            RouteStatus::Approved => write!(f, "APPROVED"),
            RouteStatus::Dispatched => write!(f, "DISPATCHED"),
            RouteStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl RouteStatus {
    /// 是否为终态（不再接受审批动作）
    pub fn is_terminal(&self) -> bool {
        matches!(self, RouteStatus::Dispatched | RouteStatus::Rejected)
    }
}

// ==========================================
// 车型等级 (Vehicle Class)
// ==========================================
// 红线: 车型必须是重量与体积容量同时覆盖聚合需求的最小等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleClass {
    Van,          // 厢式货车
    ThreeQuarter, // 3/4 吨卡车
    MediumTruck,  // 中型卡车
    HeavyTruck,   // 重型卡车
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleClass::Van => write!(f, "VAN"),
            VehicleClass::ThreeQuarter => write!(f, "THREE_QUARTER"),
            VehicleClass::MediumTruck => write!(f, "MEDIUM_TRUCK"),
            VehicleClass::HeavyTruck => write!(f, "HEAVY_TRUCK"),
        }
    }
}

impl VehicleClass {
    /// 容量表 (重量上限, 体积上限) — 固定,不可配置
    pub fn capacity(&self) -> (f64, f64) {
        match self {
            VehicleClass::Van => (1500.0, 30.0),
            VehicleClass::ThreeQuarter => (5000.0, 80.0),
            VehicleClass::MediumTruck => (12000.0, 150.0),
            VehicleClass::HeavyTruck => (25000.0, 300.0),
        }
    }

    /// 根据聚合重量/体积选择车型
    ///
    /// 规则: 重量或体积任一超过某等级容量,即升至更大等级;
    /// 超过中型卡车容量时统一落入重型卡车（最大等级）。
    pub fn for_requirement(weight: f64, volume: f64) -> Self {
        if weight > 12000.0 || volume > 150.0 {
            VehicleClass::HeavyTruck
        } else if weight > 5000.0 || volume > 80.0 {
            VehicleClass::MediumTruck
        } else if weight > 1500.0 || volume > 30.0 {
            VehicleClass::ThreeQuarter
        } else {
            VehicleClass::Van
        }
    }

    /// 从字符串解析车型
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "HEAVY_TRUCK" => VehicleClass::HeavyTruck,
            "MEDIUM_TRUCK" => VehicleClass::MediumTruck,
            "THREE_QUARTER" => VehicleClass::ThreeQuarter,
            _ => VehicleClass::Van,
        }
    }

    /// 转换为外部存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VehicleClass::Van => "VAN",
            VehicleClass::ThreeQuarter => "THREE_QUARTER",
            VehicleClass::MediumTruck => "MEDIUM_TRUCK",
            VehicleClass::HeavyTruck => "HEAVY_TRUCK",
        }
    }
}

// ==========================================
// 区域等级 (Region Class)
// ==========================================
// 首府/都市圈/内陆三级,决定动态起批阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionClass {
    Capital,      // 首府
    Metropolitan, // 都市圈
    Interior,     // 内陆
}

impl fmt::Display for RegionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionClass::Capital => write!(f, "Capital"),
            RegionClass::Metropolitan => write!(f, "Metropolitan"),
            RegionClass::Interior => write!(f, "Interior"),
        }
    }
}

// ==========================================
// 地址解析来源 (Resolution Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionSource {
    ExplicitOverride,   // 显式配送地址覆盖
    StructuredFallback, // 结构化发票地址回退
    Unresolved,         // 无法解析
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionSource::ExplicitOverride => write!(f, "EXPLICIT_OVERRIDE"),
            ResolutionSource::StructuredFallback => write!(f, "STRUCTURED_FALLBACK"),
            ResolutionSource::Unresolved => write!(f, "UNRESOLVED"),
        }
    }
}

// ==========================================
// 特殊搬运标签 (Handling Tag)
// ==========================================
// 标签去重累积,不影响车型选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandlingTag {
    CarefulHandling, // 小心轻放 (易碎/玻璃)
    Refrigeration,   // 冷链 (冷藏/冷冻)
}

impl fmt::Display for HandlingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlingTag::CarefulHandling => write!(f, "CAREFUL_HANDLING"),
            HandlingTag::Refrigeration => write!(f, "REFRIGERATION"),
        }
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_tier_total_order() {
        // 等级全序: Normal < High < Urgent
        assert!(PriorityTier::Normal < PriorityTier::High);
        assert!(PriorityTier::High < PriorityTier::Urgent);
        assert_eq!(
            PriorityTier::Normal.max(PriorityTier::Urgent),
            PriorityTier::Urgent
        );
    }

    #[test]
    fn test_vehicle_class_thresholds() {
        // 阈值边界: 重量或体积任一超限即升级
        assert_eq!(VehicleClass::for_requirement(1500.0, 30.0), VehicleClass::Van);
        assert_eq!(VehicleClass::for_requirement(1500.1, 0.0), VehicleClass::ThreeQuarter);
        assert_eq!(VehicleClass::for_requirement(0.0, 30.1), VehicleClass::ThreeQuarter);
        assert_eq!(VehicleClass::for_requirement(5000.1, 0.0), VehicleClass::MediumTruck);
        assert_eq!(VehicleClass::for_requirement(0.0, 80.1), VehicleClass::MediumTruck);
        assert_eq!(VehicleClass::for_requirement(12000.1, 0.0), VehicleClass::HeavyTruck);
        assert_eq!(VehicleClass::for_requirement(0.0, 150.1), VehicleClass::HeavyTruck);
    }

    #[test]
    fn test_vehicle_class_monotonic() {
        // 单调性: 重量/体积增加,车型等级不降
        let mut prev = VehicleClass::Van;
        for w in [0.0, 1000.0, 2000.0, 6000.0, 13000.0, 50000.0] {
            let class = VehicleClass::for_requirement(w, 0.0);
            assert!(class >= prev, "weight={} class={:?} prev={:?}", w, class, prev);
            prev = class;
        }
    }

    #[test]
    fn test_route_status_terminal() {
        assert!(RouteStatus::Dispatched.is_terminal());
        assert!(RouteStatus::Rejected.is_terminal());
        assert!(!RouteStatus::PendingApproval.is_terminal());
    }

    #[test]
    fn test_tier_from_str_roundtrip() {
        for tier in [PriorityTier::Normal, PriorityTier::High, PriorityTier::Urgent] {
            assert_eq!(PriorityTier::from_str(tier.to_db_str()), tier);
        }
    }
}
