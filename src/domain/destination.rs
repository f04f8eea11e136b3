// ==========================================
// 码头配送整合系统 - 目的地领域模型
// ==========================================
// 红线: 区域分桶是 (city, state) 的纯函数;
//       无法解析的目的地落入最保守的内陆桶
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::ResolutionSource;

// ==========================================
// Destination - 解析后的目的地
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub city: String,
    pub state: String, // 两位区域码
    pub neighborhood: String,
    pub postal_code: String,
    pub full_address: String,
    pub source: ResolutionSource,
}

impl Destination {
    /// 无法解析时的兜底目的地
    ///
    /// city="undefined" / state="XX",保证记录仍能参与整合
    pub fn unresolved(full_address: &str) -> Self {
        Self {
            city: "undefined".to_string(),
            state: "XX".to_string(),
            neighborhood: String::new(),
            postal_code: String::new(),
            full_address: full_address.to_string(),
            source: ResolutionSource::Unresolved,
        }
    }

    /// 是否为无法解析的兜底目的地
    pub fn is_unresolved(&self) -> bool {
        self.source == ResolutionSource::Unresolved
    }
}
