// ==========================================
// 码头配送整合系统 - 优先分级引擎
// ==========================================
// 红线: 规则只抬升等级,从不降低;命中多条取最高
// ==========================================
// 职责: 计算配送单优先等级 + 聚合金额
// 输入: 行项目列表 + 可选配送日期 + 当前日期
// 输出: (PriorityTier, 聚合金额)
// ==========================================

use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::debug;

use crate::config::ConsolidationConfig;
use crate::domain::delivery::LineItem;
use crate::domain::types::PriorityTier;

// ==========================================
// PriorityClassifier - 优先分级引擎
// ==========================================
pub struct PriorityClassifier {
    config: Arc<ConsolidationConfig>,
}

impl PriorityClassifier {
    /// 构造函数
    ///
    /// # 参数
    /// - config: 规则参数
    pub fn new(config: Arc<ConsolidationConfig>) -> Self {
        Self { config }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 分级单个配送单
    ///
    /// 规则 (命中即抬升,取最高):
    /// 1) 配送日 ≤ today+1 → URGENT; ≤ today+3 → 至少 HIGH
    /// 2) 聚合金额 > urgent_value_threshold → URGENT;
    ///    > high_value_threshold → 至少 HIGH
    /// 3) 行项目数 > high_item_count_threshold → 至少 HIGH
    ///
    /// 边界处理:
    /// - 配送日缺失 → 不触发日期规则
    /// - 行项目为空 → 聚合金额 0.0,等级 NORMAL
    ///
    /// # 返回
    /// (优先等级, 聚合金额)
    pub fn classify(
        &self,
        items: &[LineItem],
        delivery_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> (PriorityTier, f64) {
        let total_value: f64 = items.iter().map(|item| item.line_total).sum();
        let mut tier = PriorityTier::Normal;

        // 1. 配送日临近规则 (逾期视同最紧急)
        if let Some(date) = delivery_date {
            if date <= today + Duration::days(self.config.urgent_window_days) {
                tier = tier.max(PriorityTier::Urgent);
            } else if date <= today + Duration::days(self.config.high_window_days) {
                tier = tier.max(PriorityTier::High);
            }
        }

        // 2. 金额规则
        if total_value > self.config.urgent_value_threshold {
            tier = tier.max(PriorityTier::Urgent);
        } else if total_value > self.config.high_value_threshold {
            tier = tier.max(PriorityTier::High);
        }

        // 3. 行项目数量规则
        if items.len() > self.config.high_item_count_threshold {
            tier = tier.max(PriorityTier::High);
        }

        debug!(
            tier = %tier,
            total_value = total_value,
            item_count = items.len(),
            "优先分级完成"
        );

        (tier, total_value)
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PriorityClassifier {
        PriorityClassifier::new(Arc::new(ConsolidationConfig::default()))
    }

    fn item(total: f64) -> LineItem {
        LineItem::new("P1", "Carga geral", 1.0, "UN", total)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_normal_without_triggers() {
        // 无日期、无阈值触发 → NORMAL,且结果确定
        let items = vec![item(10_000.0), item(5_000.0)];
        let (tier, value) = classifier().classify(&items, None, today());
        assert_eq!(tier, PriorityTier::Normal);
        assert_eq!(value, 15_000.0);

        // 同输入再分级,结果一致
        let (tier2, value2) = classifier().classify(&items, None, today());
        assert_eq!(tier, tier2);
        assert_eq!(value, value2);
    }

    #[test]
    fn test_delivery_today_or_tomorrow_is_urgent() {
        let items = vec![item(100.0)];
        let c = classifier();

        let (tier, _) = c.classify(&items, Some(today()), today());
        assert_eq!(tier, PriorityTier::Urgent);

        let (tier, _) = c.classify(&items, Some(today() + Duration::days(1)), today());
        assert_eq!(tier, PriorityTier::Urgent);
    }

    #[test]
    fn test_delivery_within_three_days_is_high() {
        let items = vec![item(100.0)];
        let c = classifier();

        let (tier, _) = c.classify(&items, Some(today() + Duration::days(3)), today());
        assert_eq!(tier, PriorityTier::High);

        let (tier, _) = c.classify(&items, Some(today() + Duration::days(4)), today());
        assert_eq!(tier, PriorityTier::Normal);
    }

    #[test]
    fn test_overdue_delivery_is_urgent() {
        let items = vec![item(100.0)];
        let (tier, _) = classifier().classify(&items, Some(today() - Duration::days(2)), today());
        assert_eq!(tier, PriorityTier::Urgent);
    }

    #[test]
    fn test_value_thresholds() {
        let c = classifier();

        let (tier, value) = c.classify(&[item(100_000.5)], None, today());
        assert_eq!(tier, PriorityTier::Urgent);
        assert_eq!(value, 100_000.5);

        let (tier, _) = c.classify(&[item(60_000.0)], None, today());
        assert_eq!(tier, PriorityTier::High);

        // 恰好等于阈值不触发 (严格大于)
        let (tier, _) = c.classify(&[item(50_000.0)], None, today());
        assert_eq!(tier, PriorityTier::Normal);
    }

    #[test]
    fn test_item_count_rule() {
        let items: Vec<LineItem> = (0..51).map(|_| item(10.0)).collect();
        let (tier, _) = classifier().classify(&items, None, today());
        assert_eq!(tier, PriorityTier::High);
    }

    #[test]
    fn test_highest_rule_wins() {
        // 数量规则 HIGH + 金额规则 URGENT → URGENT
        let mut items: Vec<LineItem> = (0..51).map(|_| item(10.0)).collect();
        items.push(item(200_000.0));
        let (tier, _) = classifier().classify(&items, None, today());
        assert_eq!(tier, PriorityTier::Urgent);
    }

    #[test]
    fn test_empty_items_default_normal() {
        let (tier, value) = classifier().classify(&[], None, today());
        assert_eq!(tier, PriorityTier::Normal);
        assert_eq!(value, 0.0);
    }
}
