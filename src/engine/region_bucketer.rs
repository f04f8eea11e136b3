// ==========================================
// 码头配送整合系统 - 区域分桶引擎
// ==========================================
// 红线: 分桶是 (city, state) 的纯函数;
//       无法解析的目的地固定落入 "XX-Interior" (阈值最保守的内陆桶)
// ==========================================
// 职责: 目的地 → 区域桶键 + 动态起批阈值
// 输入: Destination + 当前小时
// 输出: RegionBucket / 最小批次数
// ==========================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ConsolidationConfig;
use crate::domain::destination::Destination;
use crate::domain::types::RegionClass;
use crate::engine::text::normalize;

// 各州首府 (归一化城市名, 区域码)
const CAPITALS: &[(&str, &str)] = &[
    ("rio branco", "AC"),
    ("maceio", "AL"),
    ("macapa", "AP"),
    ("manaus", "AM"),
    ("salvador", "BA"),
    ("fortaleza", "CE"),
    ("brasilia", "DF"),
    ("vitoria", "ES"),
    ("goiania", "GO"),
    ("sao luis", "MA"),
    ("cuiaba", "MT"),
    ("campo grande", "MS"),
    ("belo horizonte", "MG"),
    ("belem", "PA"),
    ("joao pessoa", "PB"),
    ("curitiba", "PR"),
    ("recife", "PE"),
    ("teresina", "PI"),
    ("rio de janeiro", "RJ"),
    ("natal", "RN"),
    ("porto alegre", "RS"),
    ("porto velho", "RO"),
    ("boa vista", "RR"),
    ("florianopolis", "SC"),
    ("sao paulo", "SP"),
    ("aracaju", "SE"),
    ("palmas", "TO"),
];

// 都市圈城市 (归一化城市名,固定小名单)
const METROPOLITAN_CITIES: &[&str] = &[
    "guarulhos",
    "osasco",
    "campinas",
    "santo andre",
    "sao bernardo do campo",
    "sao caetano do sul",
    "diadema",
    "niteroi",
    "duque de caxias",
    "nova iguacu",
    "sao goncalo",
    "contagem",
    "betim",
    "canoas",
    "gravatai",
    "sao jose dos pinhais",
    "olinda",
    "jaboatao dos guararapes",
    "caucaia",
    "aparecida de goiania",
];

// ==========================================
// RegionBucket - 区域桶
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBucket {
    pub key: String, // 如 "SP-Capital"
    pub state: String,
    pub class: RegionClass,
}

// ==========================================
// RegionBucketer - 区域分桶引擎
// ==========================================
pub struct RegionBucketer {
    config: Arc<ConsolidationConfig>,
    capitals: HashMap<String, String>,
    metropolitan: HashSet<String>,
}

impl RegionBucketer {
    /// 构造函数
    pub fn new(config: Arc<ConsolidationConfig>) -> Self {
        let capitals = CAPITALS
            .iter()
            .map(|(city, state)| (city.to_string(), state.to_string()))
            .collect();
        let metropolitan = METROPOLITAN_CITIES.iter().map(|c| c.to_string()).collect();
        Self {
            config,
            capitals,
            metropolitan,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 目的地 → 区域桶
    ///
    /// 规则:
    /// 1) 已知首府城市且州码一致 → "<州>-Capital"
    /// 2) 都市圈名单城市 → "<州>-Metropolitan"
    /// 3) 其余 → "<州>-Interior"
    /// 4) 无法解析的目的地 → "XX-Interior"
    pub fn bucket(&self, destination: &Destination) -> RegionBucket {
        if destination.is_unresolved() {
            return RegionBucket {
                key: "XX-Interior".to_string(),
                state: "XX".to_string(),
                class: RegionClass::Interior,
            };
        }

        let city = normalize(&destination.city);
        let state = destination.state.trim().to_uppercase();

        let class = if self.capitals.get(&city) == Some(&state) {
            RegionClass::Capital
        } else if self.metropolitan.contains(&city) {
            RegionClass::Metropolitan
        } else {
            RegionClass::Interior
        };

        RegionBucket {
            key: format!("{}-{}", state, class),
            state,
            class,
        }
    }

    /// 动态最小批次数
    ///
    /// 首府/都市圈: 常规 3,收尾时段 (≥ cutoff 小时) 2
    /// 内陆:       常规 2,收尾时段 1
    ///
    /// 收尾时段接受更小、效率更低的批次,保证当日清空
    pub fn min_batch_size(&self, class: RegionClass, hour: u32) -> usize {
        let evening = hour >= self.config.evening_cutoff_hour;
        match class {
            RegionClass::Capital | RegionClass::Metropolitan => {
                if evening {
                    2
                } else {
                    3
                }
            }
            RegionClass::Interior => {
                if evening {
                    1
                } else {
                    2
                }
            }
        }
    }
}
