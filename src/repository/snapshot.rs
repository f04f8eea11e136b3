// ==========================================
// 码头配送整合系统 - 快照仓储
// ==========================================
// 职责: 引擎全量状态的加载/保存
// 红线: 保存必须原子 (临时文件 + 重命名),半写文件不可见
// 说明: 持久化节奏由宿主决定,引擎内存状态为进程内权威
// ==========================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::delivery::DeliveryRecord;
use crate::domain::route::RouteCandidate;
use crate::repository::error::{StoreError, StoreResult};

// ==========================================
// EngineSnapshot - 引擎全量状态快照
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub records: Vec<DeliveryRecord>,
    pub routes: Vec<RouteCandidate>,
}

// ==========================================
// Trait: SnapshotRepository
// ==========================================
pub trait SnapshotRepository: Send + Sync {
    /// 加载快照,不存在时返回空快照
    fn load(&self) -> StoreResult<EngineSnapshot>;

    /// 保存快照 (整体替换)
    fn save(&self, snapshot: &EngineSnapshot) -> StoreResult<()>;
}

// ==========================================
// JsonFileSnapshotRepository - JSON 文件快照仓储
// ==========================================
pub struct JsonFileSnapshotRepository {
    path: PathBuf,
}

impl JsonFileSnapshotRepository {
    /// 构造函数
    ///
    /// # 参数
    /// - path: 快照文件路径 (父目录需已存在)
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotRepository for JsonFileSnapshotRepository {
    fn load(&self) -> StoreResult<EngineSnapshot> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "快照文件不存在,返回空快照");
            return Ok(EngineSnapshot::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        let snapshot: EngineSnapshot = serde_json::from_str(&content)?;

        info!(
            path = %self.path.display(),
            records = snapshot.records.len(),
            routes = snapshot.routes.len(),
            "快照加载完成"
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &EngineSnapshot) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(snapshot)?;

        // 原子写入: 先写临时文件,再重命名覆盖
        let tmp_path = tmp_sibling(&self.path);
        fs::write(&tmp_path, json).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_err(e))?;

        info!(
            path = %self.path.display(),
            records = snapshot.records.len(),
            routes = snapshot.routes.len(),
            "快照保存完成"
        );
        Ok(())
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

// ==========================================
// InMemorySnapshotRepository - 内存快照仓储
// ==========================================
// 测试与嵌入场景用,无磁盘副作用
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    snapshot: Mutex<EngineSnapshot>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn load(&self) -> StoreResult<EngineSnapshot> {
        self.snapshot
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| StoreError::Other(anyhow::anyhow!("快照锁中毒: {}", e)))
    }

    fn save(&self, snapshot: &EngineSnapshot) -> StoreResult<()> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| StoreError::Other(anyhow::anyhow!("快照锁中毒: {}", e)))?;
        *guard = snapshot.clone();
        Ok(())
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileSnapshotRepository::new(dir.path().join("snapshot.json"));
        let snapshot = repo.load().unwrap();
        assert!(snapshot.records.is_empty());
        assert!(snapshot.routes.is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileSnapshotRepository::new(dir.path().join("snapshot.json"));

        let snapshot = EngineSnapshot::default();
        repo.save(&snapshot).unwrap();

        let loaded = repo.load().unwrap();
        assert!(loaded.records.is_empty());

        // 临时文件不可残留
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_in_memory_roundtrip() {
        let repo = InMemorySnapshotRepository::new();
        repo.save(&EngineSnapshot::default()).unwrap();
        let loaded = repo.load().unwrap();
        assert!(loaded.records.is_empty());
    }
}
