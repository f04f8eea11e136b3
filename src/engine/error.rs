// ==========================================
// 码头配送整合系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 审批类错误不得伴随任何部分变更
// ==========================================

use thiserror::Error;
use uuid::Uuid;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 查找错误 =====
    #[error("路线未找到: route_id={0}")]
    RouteNotFound(Uuid),

    #[error("配送单未找到: record_id={0}")]
    RecordNotFound(Uuid),

    // ===== 状态机错误 =====
    #[error("无效的状态转换: route_id={route_id}, from={from} to={to}")]
    InvalidStateTransition {
        route_id: Uuid,
        from: String,
        to: String,
    },

    #[error("配送单已被候选占用: record_id={record_id}, candidate_id={candidate_id}")]
    RecordAlreadyBooked {
        record_id: Uuid,
        candidate_id: Uuid,
    },

    #[error("配送单不在待整合状态: record_id={record_id}, status={status}")]
    RecordNotPending { record_id: Uuid, status: String },

    // ===== 输入错误 =====
    #[error("候选成员列表为空")]
    EmptyCandidate,

    // ===== 并发错误 =====
    #[error("引擎锁中毒: {0}")]
    LockPoisoned(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
