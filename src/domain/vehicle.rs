// ==========================================
// 码头配送整合系统 - 车辆需求领域模型
// ==========================================
// 红线: 装载率必须按"所分配车型"的容量计算,绝不按更大车型
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::{HandlingTag, VehicleClass};

// ==========================================
// VehicleRequirement - 车辆需求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRequirement {
    pub weight: f64, // 估算重量
    pub volume: f64, // 估算体积
    pub vehicle_class: VehicleClass,
    pub handling_tags: Vec<HandlingTag>, // 去重后的特殊搬运标签
    pub utilization_pct: i32,            // 装载率 (%)
}

impl VehicleRequirement {
    /// 由估算重量/体积/标签构建,车型与装载率随之推导
    pub fn from_estimates(weight: f64, volume: f64, handling_tags: Vec<HandlingTag>) -> Self {
        let vehicle_class = VehicleClass::for_requirement(weight, volume);
        let utilization_pct = Self::utilization(weight, volume, vehicle_class);
        Self {
            weight,
            volume,
            vehicle_class,
            handling_tags,
            utilization_pct,
        }
    }

    /// 逐元素聚合多条车辆需求 (重量/体积求和,标签并集)
    ///
    /// 聚合结果重新定级、重新计算装载率
    pub fn aggregate<'a, I>(requirements: I) -> Self
    where
        I: IntoIterator<Item = &'a VehicleRequirement>,
    {
        let mut weight = 0.0;
        let mut volume = 0.0;
        let mut tags: Vec<HandlingTag> = Vec::new();

        for req in requirements {
            weight += req.weight;
            volume += req.volume;
            for tag in &req.handling_tags {
                if !tags.contains(tag) {
                    tags.push(*tag);
                }
            }
        }

        Self::from_estimates(weight, volume, tags)
    }

    /// 装载率 = max(重量占比, 体积占比) × 100,四舍五入
    fn utilization(weight: f64, volume: f64, class: VehicleClass) -> i32 {
        let (cap_weight, cap_volume) = class.capacity();
        let ratio = (weight / cap_weight).max(volume / cap_volume);
        (ratio * 100.0).round() as i32
    }
}
