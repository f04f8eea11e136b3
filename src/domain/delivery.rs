// ==========================================
// 码头配送整合系统 - 配送单领域模型
// ==========================================
// 职责: 定义配送单实体(一张发票一条记录)及其摄入输入
// 红线: 估算金额与车辆需求在摄入后不可变,仅状态转移可修改记录
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::destination::Destination;
use crate::domain::types::{PriorityTier, RecordStatus};
use crate::domain::vehicle::VehicleRequirement;

// ==========================================
// LineItem - 发票行项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub code: String,        // 产品编码
    pub description: String, // 产品描述
    pub quantity: f64,       // 数量
    pub unit: String,        // 计量单位
    pub unit_price: f64,     // 单价
    pub line_total: f64,     // 行小计 (quantity × unit_price)
}

impl LineItem {
    /// 创建行项目,行小计由数量与单价推导
    pub fn new(code: &str, description: &str, quantity: f64, unit: &str, unit_price: f64) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            quantity,
            unit: unit.to_string(),
            unit_price,
            line_total: quantity * unit_price,
        }
    }
}

// ==========================================
// RawAddress - 结构化发票地址
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAddress {
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,       // 两位区域码 (邮政缩写)
    pub postal_code: String,
}

// ==========================================
// DeliveryDraft - 摄入输入
// ==========================================
// 由外部发票解析协作方产出的结构化形态;
// 引擎只消费该形态,不做 XML 解析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryDraft {
    pub invoice_number: String,
    pub issue_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub invoice_address: RawAddress,
    /// 自由文本配送地址覆盖,优先于结构化地址
    pub delivery_address_override: Option<String>,
    pub items: Vec<LineItem>,
}

// ==========================================
// DeliveryRecord - 配送单
// ==========================================
// 生命周期: 摄入时创建 → PENDING → ROUTED → (外部: 装车/完成)
//           路线驳回时回到 PENDING
// 红线: 同一时刻最多归属一个活动候选/路线 (candidate_id 防双占)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    // ===== 标识 =====
    pub id: Uuid,               // 摄入时分配
    pub invoice_number: String, // 源发票号

    // ===== 摄入时标注 (此后不可变) =====
    pub items: Vec<LineItem>,
    pub destination: Destination,
    pub priority_tier: PriorityTier,
    pub total_value: f64, // 估算金额 = 行小计之和
    pub vehicle_requirement: VehicleRequirement,
    pub delivery_date: Option<NaiveDate>,

    // ===== 生命周期 =====
    pub status: RecordStatus,
    pub route_id: Option<Uuid>,     // 批准后关联的路线
    pub candidate_id: Option<Uuid>, // 待审批候选占用标记 (防双占)
    pub ingested_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// 是否可参与新一轮分组
    ///
    /// 待审批候选的成员在逻辑上仍是 PENDING,
    /// 但在审批结束前不得被再次分组
    pub fn is_available_for_batching(&self) -> bool {
        self.status == RecordStatus::Pending && self.candidate_id.is_none()
    }
}
