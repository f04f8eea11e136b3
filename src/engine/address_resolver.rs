// ==========================================
// 码头配送整合系统 - 地址解析引擎
// ==========================================
// 红线: 任何畸形输入都必须产出尽力而为的目的地,绝不失败
// ==========================================
// 职责: 从配送单原始地址数据解析归一化目的地
// 输入: 结构化发票地址 + 可选自由文本配送地址覆盖
// 输出: Destination (含解析来源标记)
// ==========================================

use tracing::debug;

use crate::domain::delivery::RawAddress;
use crate::domain::destination::Destination;
use crate::domain::types::ResolutionSource;
use crate::engine::text::normalize;

// 邮政两位区域码缩写表
const REGION_CODES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

// ==========================================
// AddressResolver - 地址解析引擎
// ==========================================
pub struct AddressResolver {
    // 无状态引擎,不需要注入依赖
}

impl AddressResolver {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 解析目的地
    ///
    /// 规则:
    /// 1) 存在非空配送地址覆盖时优先,从覆盖文本中模式匹配 city/state
    /// 2) 覆盖文本解析失败时,city/state 回退到结构化地址,
    ///    展示地址仍使用覆盖文本
    /// 3) 无覆盖时直接采用结构化发票地址
    /// 4) 均无可用 city 时产出 "undefined"/"XX" 兜底目的地
    pub fn resolve(&self, invoice_address: &RawAddress, override_text: Option<&str>) -> Destination {
        let override_text = override_text.map(str::trim).filter(|s| !s.is_empty());

        if let Some(text) = override_text {
            if let Some((city, state)) = self.parse_city_state(text) {
                debug!(city = %city, state = %state, "覆盖地址解析成功");
                return Destination {
                    city,
                    state,
                    neighborhood: invoice_address.neighborhood.clone(),
                    postal_code: invoice_address.postal_code.clone(),
                    full_address: text.to_string(),
                    source: ResolutionSource::ExplicitOverride,
                };
            }

            // 覆盖文本无法解析 city/state,回退到结构化字段
            if !invoice_address.city.trim().is_empty() {
                debug!(city = %invoice_address.city, "覆盖地址解析失败,回退结构化地址");
                return Destination {
                    city: invoice_address.city.trim().to_string(),
                    state: self.usable_state(&invoice_address.state),
                    neighborhood: invoice_address.neighborhood.clone(),
                    postal_code: invoice_address.postal_code.clone(),
                    full_address: text.to_string(),
                    source: ResolutionSource::StructuredFallback,
                };
            }

            return Destination::unresolved(text);
        }

        // 无覆盖: 结构化地址原样采用
        if !invoice_address.city.trim().is_empty() {
            return Destination {
                city: invoice_address.city.trim().to_string(),
                state: self.usable_state(&invoice_address.state),
                neighborhood: invoice_address.neighborhood.clone(),
                postal_code: invoice_address.postal_code.clone(),
                full_address: self.compose_full_address(invoice_address),
                source: ResolutionSource::StructuredFallback,
            };
        }

        Destination::unresolved(&self.compose_full_address(invoice_address))
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 从自由文本中解析 (city, state)
    ///
    /// 以分隔符切词,寻找合法的两位区域码,
    /// 其前一个非空词段视为城市名
    fn parse_city_state(&self, text: &str) -> Option<(String, String)> {
        let tokens: Vec<&str> = text
            .split(|c| c == '/' || c == '-' || c == ',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        for (idx, token) in tokens.iter().enumerate() {
            let candidate = token.to_uppercase();
            if candidate.len() == 2 && REGION_CODES.contains(&candidate.as_str()) && idx > 0 {
                let city = tokens[idx - 1].to_string();
                if !city.is_empty() && !normalize(&city).chars().all(|c| c.is_ascii_digit()) {
                    return Some((city, candidate));
                }
            }
        }

        None
    }

    /// 结构化州字段的兜底处理
    fn usable_state(&self, state: &str) -> String {
        let trimmed = state.trim();
        if trimmed.is_empty() {
            "XX".to_string()
        } else {
            trimmed.to_uppercase()
        }
    }

    /// 由结构化字段拼装展示地址
    fn compose_full_address(&self, address: &RawAddress) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !address.street.trim().is_empty() {
            if address.number.trim().is_empty() {
                parts.push(address.street.trim().to_string());
            } else {
                parts.push(format!("{}, {}", address.street.trim(), address.number.trim()));
            }
        }
        if !address.neighborhood.trim().is_empty() {
            parts.push(address.neighborhood.trim().to_string());
        }
        if !address.city.trim().is_empty() {
            parts.push(format!("{}/{}", address.city.trim(), address.state.trim()));
        }
        parts.join(" - ")
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for AddressResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn structured_address(city: &str, state: &str) -> RawAddress {
        RawAddress {
            street: "Rua das Docas".to_string(),
            number: "100".to_string(),
            neighborhood: "Centro".to_string(),
            city: city.to_string(),
            state: state.to_string(),
            postal_code: "01000-000".to_string(),
        }
    }

    #[test]
    fn test_override_takes_precedence() {
        // 覆盖地址优先,按区域码模式匹配 city/state
        let resolver = AddressResolver::new();
        let dest = resolver.resolve(
            &structured_address("Campinas", "SP"),
            Some("Av. Portuária, 250 - Santos/SP"),
        );

        assert_eq!(dest.city, "Santos");
        assert_eq!(dest.state, "SP");
        assert_eq!(dest.source, ResolutionSource::ExplicitOverride);
        assert_eq!(dest.full_address, "Av. Portuária, 250 - Santos/SP");
    }

    #[test]
    fn test_unparseable_override_falls_back_to_structured() {
        // 覆盖文本无法解析时: city/state 回退结构化地址,展示地址保留覆盖文本
        let resolver = AddressResolver::new();
        let dest = resolver.resolve(
            &structured_address("Campinas", "SP"),
            Some("entregar no portão azul dos fundos"),
        );

        assert_eq!(dest.city, "Campinas");
        assert_eq!(dest.state, "SP");
        assert_eq!(dest.source, ResolutionSource::StructuredFallback);
        assert_eq!(dest.full_address, "entregar no portão azul dos fundos");
    }

    #[test]
    fn test_structured_address_without_override() {
        let resolver = AddressResolver::new();
        let dest = resolver.resolve(&structured_address("São Paulo", "sp"), None);

        assert_eq!(dest.city, "São Paulo");
        assert_eq!(dest.state, "SP"); // 州码统一大写
        assert_eq!(dest.source, ResolutionSource::StructuredFallback);
    }

    #[test]
    fn test_no_usable_city_yields_unresolved() {
        let resolver = AddressResolver::new();
        let empty = RawAddress::default();
        let dest = resolver.resolve(&empty, None);

        assert_eq!(dest.city, "undefined");
        assert_eq!(dest.state, "XX");
        assert_eq!(dest.source, ResolutionSource::Unresolved);
    }

    #[test]
    fn test_override_with_empty_structured_yields_unresolved() {
        // 覆盖文本解析失败且结构化地址为空 → 兜底目的地保留覆盖文本
        let resolver = AddressResolver::new();
        let dest = resolver.resolve(&RawAddress::default(), Some("sem endereço legível"));

        assert_eq!(dest.city, "undefined");
        assert_eq!(dest.state, "XX");
        assert_eq!(dest.full_address, "sem endereço legível");
    }

    #[test]
    fn test_comma_separated_override() {
        let resolver = AddressResolver::new();
        let dest = resolver.resolve(
            &RawAddress::default(),
            Some("Rua XV, 80, Curitiba, PR"),
        );

        assert_eq!(dest.city, "Curitiba");
        assert_eq!(dest.state, "PR");
        assert_eq!(dest.source, ResolutionSource::ExplicitOverride);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let resolver = AddressResolver::new();
        let dest = resolver.resolve(&structured_address("Campinas", "SP"), Some("   "));

        assert_eq!(dest.city, "Campinas");
        assert_eq!(dest.source, ResolutionSource::StructuredFallback);
    }
}
