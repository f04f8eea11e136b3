// ==========================================
// 码头配送整合系统 - 车辆估算引擎
// ==========================================
// 红线: 每个行项目只命中一个重量类别 (金属→液体→轻质,先到先得)
// ==========================================
// 职责: 按行项目估算重量/体积与特殊搬运标签,推导车型与装载率
// 输入: 行项目列表
// 输出: VehicleRequirement
// ==========================================

use std::sync::Arc;
use tracing::debug;

use crate::config::ConsolidationConfig;
use crate::domain::delivery::LineItem;
use crate::domain::types::HandlingTag;
use crate::domain::vehicle::VehicleRequirement;
use crate::engine::text::normalize;

// 关键字表 (归一化后的小写无重音子串)
const METAL_KEYWORDS: &[&str] = &["metal", "aco", "ferro", "steel", "iron"];
const LIQUID_KEYWORDS: &[&str] = &["liquido", "liquid", "oleo", "oil", "tinta"];
const LIGHT_KEYWORDS: &[&str] = &["papel", "paper", "tecido", "textil", "textile"];
const FRAGILE_KEYWORDS: &[&str] = &["fragil", "fragile", "vidro", "glass"];
const REFRIGERATED_KEYWORDS: &[&str] = &["refrigerad", "refrigerated", "gelad", "cold", "congelad"];

// ==========================================
// VehicleSizingEstimator - 车辆估算引擎
// ==========================================
pub struct VehicleSizingEstimator {
    config: Arc<ConsolidationConfig>,
}

impl VehicleSizingEstimator {
    /// 构造函数
    pub fn new(config: Arc<ConsolidationConfig>) -> Self {
        Self { config }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 估算车辆需求
    ///
    /// 规则:
    /// 1) 行项目重量 = 数量 × 单位重量;单位重量按描述关键字取值,
    ///    无命中取默认值
    /// 2) 行项目体积 = 数量 × 固定单位体积
    /// 3) 特殊搬运标签去重累积 (易碎/冷链)
    /// 4) 车型取重量与体积均可容纳的最小等级,装载率按该车型容量计算
    pub fn estimate(&self, items: &[LineItem]) -> VehicleRequirement {
        let mut weight = 0.0;
        let mut volume = 0.0;
        let mut tags: Vec<HandlingTag> = Vec::new();

        for item in items {
            let description = normalize(&item.description);

            weight += item.quantity * self.unit_weight(&description);
            volume += item.quantity * self.config.unit_volume;

            if contains_any(&description, FRAGILE_KEYWORDS)
                && !tags.contains(&HandlingTag::CarefulHandling)
            {
                tags.push(HandlingTag::CarefulHandling);
            }
            if contains_any(&description, REFRIGERATED_KEYWORDS)
                && !tags.contains(&HandlingTag::Refrigeration)
            {
                tags.push(HandlingTag::Refrigeration);
            }
        }

        let requirement = VehicleRequirement::from_estimates(weight, volume, tags);

        debug!(
            weight = requirement.weight,
            volume = requirement.volume,
            vehicle_class = %requirement.vehicle_class,
            utilization_pct = requirement.utilization_pct,
            "车辆估算完成"
        );

        requirement
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 描述关键字 → 单位重量,首个命中类别生效
    ///
    /// 类别检查顺序: 金属 → 液体 → 轻质 (纸品/纺织)
    fn unit_weight(&self, normalized_description: &str) -> f64 {
        if contains_any(normalized_description, METAL_KEYWORDS) {
            self.config.metal_unit_weight
        } else if contains_any(normalized_description, LIQUID_KEYWORDS) {
            self.config.liquid_unit_weight
        } else if contains_any(normalized_description, LIGHT_KEYWORDS) {
            self.config.light_unit_weight
        } else {
            self.config.default_unit_weight
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}
