// ==========================================
// 码头配送整合系统 - 路线候选领域模型
// ==========================================
// 职责: 同一区域桶内配送单的批次实体
// 红线: 停靠序号必须是 1..N 的排列,无空洞无重复
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{RegionClass, RouteStatus};
use crate::domain::vehicle::VehicleRequirement;

// ==========================================
// RouteStop - 配送停靠点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub sequence_no: u32, // 1..N
    pub record_id: Uuid,
    pub invoice_number: String,
    pub city: String,
    pub estimated_minutes: i64, // 单停靠估时
}

// ==========================================
// RouteCandidate - 路线候选 / 路线
// ==========================================
// 生命周期: 评估通过阈值时创建(PENDING_APPROVAL) →
//           批准后定序并发运 / 驳回后废弃(成员回到待整合池)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub id: Uuid,
    pub bucket_key: String, // 区域桶键,如 "SP-Capital"
    pub region_class: RegionClass,
    pub member_ids: Vec<Uuid>, // 有序成员配送单 id
    pub total_value: f64,      // 聚合金额
    pub vehicle_requirement: VehicleRequirement,
    pub stops: Vec<RouteStop>, // 批准时定序,候选阶段为空
    pub estimated_duration_min: i64,
    pub status: RouteStatus,
    pub created_at: DateTime<Utc>,
}

impl RouteCandidate {
    /// 成员数量
    pub fn member_count(&self) -> usize {
        self.member_ids.len()
    }
}
