// ==========================================
// 码头配送整合系统 - 发运交接边界
// ==========================================
// 职责: 批准路线的整合载货交付外部排队/装载子系统
// 红线: 交接失败只记录,不回滚路线的 DISPATCHED 状态
//       (重试由外部适配方自身策略负责)
// ==========================================

use std::sync::Mutex;

use tracing::info;

use crate::domain::load::ConsolidatedLoad;

// ==========================================
// Trait: DispatchAdapter
// ==========================================
pub trait DispatchAdapter: Send + Sync {
    /// 交接整合载货
    ///
    /// 引擎不期待返回值语义,Err 仅用于记录
    fn dispatch(&self, load: &ConsolidatedLoad) -> anyhow::Result<()>;
}

// ==========================================
// LoggingDispatchAdapter - 默认适配器
// ==========================================
// 仅记录交接日志,适合未接入装载子系统的宿主
pub struct LoggingDispatchAdapter;

impl DispatchAdapter for LoggingDispatchAdapter {
    fn dispatch(&self, load: &ConsolidatedLoad) -> anyhow::Result<()> {
        info!(
            route_id = %load.route_id,
            bucket_key = %load.bucket_key,
            stops = load.stops.len(),
            manifest_lines = load.manifest.len(),
            total_value = load.total_value,
            vehicle_class = %load.vehicle_requirement.vehicle_class,
            "整合载货交接发运"
        );
        Ok(())
    }
}

// ==========================================
// RecordingDispatchAdapter - 测试替身
// ==========================================
// 捕获交接的载货,供断言使用;可配置为固定失败
pub struct RecordingDispatchAdapter {
    loads: Mutex<Vec<ConsolidatedLoad>>,
    fail: bool,
}

impl RecordingDispatchAdapter {
    pub fn new() -> Self {
        Self {
            loads: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// 构造固定失败的适配器 (验证引擎不回滚)
    pub fn failing() -> Self {
        Self {
            loads: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// 已捕获的载货副本
    pub fn dispatched_loads(&self) -> Vec<ConsolidatedLoad> {
        self.loads
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Default for RecordingDispatchAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchAdapter for RecordingDispatchAdapter {
    fn dispatch(&self, load: &ConsolidatedLoad) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("adapter indisponível");
        }
        if let Ok(mut guard) = self.loads.lock() {
            guard.push(load.clone());
        }
        Ok(())
    }
}
