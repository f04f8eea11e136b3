// ==========================================
// 码头配送整合系统 - 配置层
// ==========================================
// 职责: 集中管理规则参数,注入各引擎
// 红线: 默认值即业务规则的权威常量,修改须经领域负责人确认
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ConsolidationConfig - 整合规则参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationConfig {
    // ===== 分级阈值 (Classifier) =====
    /// 聚合金额超过该值 → URGENT
    pub urgent_value_threshold: f64,
    /// 聚合金额超过该值 → 至少 HIGH
    pub high_value_threshold: f64,
    /// 行项目数超过该值 → 至少 HIGH
    pub high_item_count_threshold: usize,
    /// 配送日在 today + N 天内 → URGENT
    pub urgent_window_days: i64,
    /// 配送日在 today + N 天内 → 至少 HIGH
    pub high_window_days: i64,

    // ===== 重量/体积估算 (Vehicle Sizing) =====
    /// 默认单位重量
    pub default_unit_weight: f64,
    /// 金属类单位重量
    pub metal_unit_weight: f64,
    /// 液体类单位重量
    pub liquid_unit_weight: f64,
    /// 纸品/纺织类单位重量
    pub light_unit_weight: f64,
    /// 固定单位体积
    pub unit_volume: f64,

    // ===== 动态起批阈值 (Region Bucketer) =====
    /// 当日收尾时段起始小时,之后接受更小批次
    pub evening_cutoff_hour: u32,

    // ===== 停靠估时 (Consolidation) =====
    /// 单停靠估时下限 (分钟)
    pub stop_floor_minutes: i64,
    /// 单停靠基准时长 (分钟)
    pub stop_base_minutes: i64,
    /// 每个后续停靠的递增时长 (分钟)
    pub stop_increment_minutes: i64,
    /// URGENT 停靠时长调整 (分钟)
    pub urgent_stop_adjustment_minutes: i64,
    /// HIGH 停靠时长调整 (分钟)
    pub high_stop_adjustment_minutes: i64,
    /// 路线固定准备时长 (分钟)
    pub route_setup_minutes: i64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            urgent_value_threshold: 100_000.0,
            high_value_threshold: 50_000.0,
            high_item_count_threshold: 50,
            urgent_window_days: 1,
            high_window_days: 3,

            default_unit_weight: 0.5,
            metal_unit_weight: 2.0,
            liquid_unit_weight: 1.0,
            light_unit_weight: 0.2,
            unit_volume: 0.01,

            evening_cutoff_hour: 16,

            stop_floor_minutes: 30,
            stop_base_minutes: 45,
            stop_increment_minutes: 25,
            urgent_stop_adjustment_minutes: -10,
            high_stop_adjustment_minutes: -5,
            route_setup_minutes: 30,
        }
    }
}
