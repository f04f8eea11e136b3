// ==========================================
// 码头配送整合系统 - 整合载货领域模型
// ==========================================
// 职责: 批准路线的合并货单,交付外部发运/装载子系统
// 红线: 发运交接后引擎不再持有修改权
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::route::RouteStop;
use crate::domain::vehicle::VehicleRequirement;

// ==========================================
// ManifestLine - 合并货单行
// ==========================================
// 跨成员按产品编码合并,保留源发票/配送单回溯引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestLine {
    pub code: String,
    pub description: String,
    pub quantity: f64,
    pub total_value: f64,
    pub invoice_refs: Vec<String>, // 源发票号回溯
    pub record_refs: Vec<Uuid>,    // 源配送单 id 回溯
}

// ==========================================
// ConsolidatedLoad - 整合载货
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedLoad {
    pub route_id: Uuid,
    pub bucket_key: String,
    pub manifest: Vec<ManifestLine>, // 按合计金额降序
    pub vehicle_requirement: VehicleRequirement,
    pub stops: Vec<RouteStop>, // 配送停靠序列 (独立于货单顺序)
    pub estimated_duration_min: i64,
    pub total_value: f64,
}

impl ConsolidatedLoad {
    /// 货单行数
    pub fn manifest_line_count(&self) -> usize {
        self.manifest.len()
    }
}
