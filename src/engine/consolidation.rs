// ==========================================
// 码头配送整合系统 - 整合引擎 (编排器)
// ==========================================
// 职责: 待整合池管理、阈值起批、审批生命周期、停靠定序、货单合并
// 红线1: 池变更与评估互斥 (单写者纪律,作用域锁)
// 红线2: 驳回必须是成员的真无操作 (审批前不提交任何成员状态)
// 红线3: 整合绝不静默丢单 (无法解析的记录照常参与分桶)
// 红线4: 锁内不做外部 I/O,发运交接在释放锁之后
// ==========================================

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::ConsolidationConfig;
use crate::domain::delivery::{DeliveryDraft, DeliveryRecord};
use crate::domain::load::{ConsolidatedLoad, ManifestLine};
use crate::domain::route::{RouteCandidate, RouteStop};
use crate::domain::types::{PriorityTier, RecordStatus, RouteStatus};
use crate::domain::vehicle::VehicleRequirement;
use crate::engine::address_resolver::AddressResolver;
use crate::engine::classifier::PriorityClassifier;
use crate::engine::dispatch::DispatchAdapter;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::region_bucketer::{RegionBucket, RegionBucketer};
use crate::engine::text::normalize;
use crate::engine::vehicle_sizing::VehicleSizingEstimator;
use crate::repository::EngineSnapshot;

// ==========================================
// EngineState - 锁保护的内部状态
// ==========================================
#[derive(Debug, Default)]
struct EngineState {
    records: HashMap<Uuid, DeliveryRecord>,
    routes: HashMap<Uuid, RouteCandidate>,
}

// ==========================================
// ConsolidationEngine - 整合引擎
// ==========================================
// 显式实例持有自己的池与路线集合,由宿主按句柄传递;
// 评估由宿主显式调用,引擎内部无定时器
pub struct ConsolidationEngine {
    config: Arc<ConsolidationConfig>,
    resolver: AddressResolver,
    classifier: PriorityClassifier,
    sizing: VehicleSizingEstimator,
    bucketer: RegionBucketer,
    dispatch: Arc<dyn DispatchAdapter>,
    inner: Mutex<EngineState>,
}

impl ConsolidationEngine {
    /// 创建新的整合引擎实例
    ///
    /// # 参数
    /// - config: 规则参数
    /// - dispatch: 发运交接适配器
    pub fn new(config: ConsolidationConfig, dispatch: Arc<dyn DispatchAdapter>) -> Self {
        let config = Arc::new(config);
        Self {
            resolver: AddressResolver::new(),
            classifier: PriorityClassifier::new(config.clone()),
            sizing: VehicleSizingEstimator::new(config.clone()),
            bucketer: RegionBucketer::new(config.clone()),
            config,
            dispatch,
            inner: Mutex::new(EngineState::default()),
        }
    }

    // ==========================================
    // 摄入
    // ==========================================

    /// 摄入一条配送单
    ///
    /// 解析目的地、分级、估算车辆需求后入池,返回分配的 id。
    /// 畸形地址不拒单: 兜底进入 "XX-Interior" 桶,待操作员后续处理。
    /// 摄入不阻塞在起批结果上,仅短暂持锁入池。
    #[instrument(skip(self, draft), fields(invoice_number = %draft.invoice_number))]
    pub fn ingest(&self, draft: DeliveryDraft, today: NaiveDate) -> EngineResult<Uuid> {
        let destination = self
            .resolver
            .resolve(&draft.invoice_address, draft.delivery_address_override.as_deref());
        let (priority_tier, total_value) =
            self.classifier.classify(&draft.items, draft.delivery_date, today);
        let vehicle_requirement = self.sizing.estimate(&draft.items);

        let record = DeliveryRecord {
            id: Uuid::new_v4(),
            invoice_number: draft.invoice_number,
            items: draft.items,
            destination,
            priority_tier,
            total_value,
            vehicle_requirement,
            delivery_date: draft.delivery_date,
            status: RecordStatus::Pending,
            route_id: None,
            candidate_id: None,
            ingested_at: Utc::now(),
        };
        let record_id = record.id;
        let bucket = self.bucketer.bucket(&record.destination);

        {
            let mut state = self.lock()?;
            state.records.insert(record_id, record);
        }

        info!(
            record_id = %record_id,
            priority_tier = %priority_tier,
            total_value = total_value,
            bucket_key = %bucket.key,
            "配送单摄入完成"
        );

        Ok(record_id)
    }

    // ==========================================
    // 评估 (起批)
    // ==========================================

    /// 执行一次起批评估
    ///
    /// 流程:
    /// 1) 过滤待整合且未被候选占用的配送单
    /// 2) 按区域桶分组
    /// 3) 成员数达到该桶动态阈值的桶,冻结为待审批候选
    ///
    /// 成员在审批通过前不脱离逻辑待整合状态 (驳回即真无操作),
    /// 但通过 candidate_id 防止被后续评估重复分组。
    ///
    /// # 返回
    /// 本次新建的待审批候选列表
    #[instrument(skip(self), fields(hour = now.hour()))]
    pub fn evaluate(&self, now: NaiveDateTime) -> EngineResult<Vec<RouteCandidate>> {
        let mut state = self.lock()?;

        // 1-2. 过滤 + 分组 (按摄入顺序排序,BTreeMap 保证桶遍历顺序确定)
        let mut available: Vec<_> = state
            .records
            .values()
            .filter(|r| r.is_available_for_batching())
            .map(|r| (r.ingested_at, r.id, self.bucketer.bucket(&r.destination)))
            .collect();
        available.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut buckets: BTreeMap<String, (RegionBucket, Vec<Uuid>)> = BTreeMap::new();
        for (_, id, bucket) in available {
            buckets
                .entry(bucket.key.clone())
                .or_insert_with(|| (bucket, Vec::new()))
                .1
                .push(id);
        }

        // 3. 阈值判定与候选冻结
        let mut created = Vec::new();
        for (key, (bucket, member_ids)) in buckets {
            let min_size = self.bucketer.min_batch_size(bucket.class, now.hour());
            if member_ids.len() < min_size {
                debug!(
                    bucket_key = %key,
                    pending = member_ids.len(),
                    min_size = min_size,
                    "桶未达起批阈值,保持待整合"
                );
                continue;
            }

            let candidate = Self::build_candidate(&mut state, bucket, member_ids)?;
            info!(
                route_id = %candidate.id,
                bucket_key = %candidate.bucket_key,
                members = candidate.member_count(),
                total_value = candidate.total_value,
                "路线候选创建,进入待审批"
            );
            created.push(candidate);
        }

        Ok(created)
    }

    /// 操作员强制起批 (显式 id 列表)
    ///
    /// 用于长期未达阈值的桶;所有成员必须待整合且未被占用,
    /// 校验失败时不发生任何变更。桶键取首个成员的目的地
    /// (跨桶成员列表由操作员判断负责)。
    #[instrument(skip(self, record_ids), fields(count = record_ids.len()))]
    pub fn force_create_candidate(&self, record_ids: &[Uuid]) -> EngineResult<RouteCandidate> {
        let mut state = self.lock()?;

        // 去重保序
        let mut member_ids: Vec<Uuid> = Vec::new();
        for id in record_ids {
            if !member_ids.contains(id) {
                member_ids.push(*id);
            }
        }
        if member_ids.is_empty() {
            return Err(EngineError::EmptyCandidate);
        }

        // 先整体校验,保证失败时零变更
        for id in &member_ids {
            let record = state
                .records
                .get(id)
                .ok_or(EngineError::RecordNotFound(*id))?;
            if record.status != RecordStatus::Pending {
                return Err(EngineError::RecordNotPending {
                    record_id: *id,
                    status: record.status.to_string(),
                });
            }
            if let Some(candidate_id) = record.candidate_id {
                return Err(EngineError::RecordAlreadyBooked {
                    record_id: *id,
                    candidate_id,
                });
            }
        }

        let first = state
            .records
            .get(&member_ids[0])
            .ok_or(EngineError::RecordNotFound(member_ids[0]))?;
        let bucket = self.bucketer.bucket(&first.destination);

        let candidate = Self::build_candidate(&mut state, bucket, member_ids)?;
        info!(
            route_id = %candidate.id,
            members = candidate.member_count(),
            "操作员强制起批"
        );
        Ok(candidate)
    }

    // ==========================================
    // 审批
    // ==========================================

    /// 批准路线候选
    ///
    /// 流程 (锁内):
    /// 1) 货单顺序 = 等级降序、金额降序
    /// 2) 停靠序列 = 等级降序、城市升序 (独立于货单顺序),序号 1..N
    /// 3) 聚合车辆需求重新定级与装载率计算
    /// 4) 停靠估时 = max(下限, 基准 + 递增×停靠序 + 等级调整),
    ///    总时长加固定准备时长
    /// 5) 按产品编码合并货单,保留发票/配送单回溯,按合计金额降序
    /// 6) 成员 → ROUTED 并关联路线,路线 → APPROVED
    ///
    /// 发运交接在释放锁之后执行;交接失败仅记录,
    /// 路线仍结束于 DISPATCHED (重试属于适配方)。
    #[instrument(skip(self), fields(route_id = %route_id))]
    pub fn approve(&self, route_id: Uuid) -> EngineResult<ConsolidatedLoad> {
        let load = {
            let mut state = self.lock()?;

            let route = state
                .routes
                .get(&route_id)
                .ok_or(EngineError::RouteNotFound(route_id))?;
            if route.status != RouteStatus::PendingApproval {
                return Err(EngineError::InvalidStateTransition {
                    route_id,
                    from: route.status.to_string(),
                    to: RouteStatus::Approved.to_string(),
                });
            }
            let member_ids = route.member_ids.clone();
            let bucket_key = route.bucket_key.clone();

            // 先整体取出成员副本,缺失即报错且零变更
            let mut members: Vec<DeliveryRecord> = Vec::with_capacity(member_ids.len());
            for id in &member_ids {
                let record = state
                    .records
                    .get(id)
                    .ok_or(EngineError::RecordNotFound(*id))?;
                members.push(record.clone());
            }

            // 1. 货单顺序
            let mut manifest_order = members.clone();
            manifest_order.sort_by(|a, b| {
                b.priority_tier.cmp(&a.priority_tier).then(
                    b.total_value
                        .partial_cmp(&a.total_value)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
            });

            // 2. 停靠序列 (刻意独立的另一种排序,仅用于停靠顺序)
            let mut stop_order = members.clone();
            stop_order.sort_by(|a, b| {
                b.priority_tier
                    .cmp(&a.priority_tier)
                    .then(normalize(&a.destination.city).cmp(&normalize(&b.destination.city)))
            });

            let stops: Vec<RouteStop> = stop_order
                .iter()
                .enumerate()
                .map(|(idx, record)| RouteStop {
                    sequence_no: idx as u32 + 1,
                    record_id: record.id,
                    invoice_number: record.invoice_number.clone(),
                    city: record.destination.city.clone(),
                    estimated_minutes: self.stop_minutes(idx, record.priority_tier),
                })
                .collect();
            let estimated_duration_min = stops
                .iter()
                .map(|s| s.estimated_minutes)
                .sum::<i64>()
                + self.config.route_setup_minutes;

            // 3. 聚合车辆需求
            let vehicle_requirement =
                VehicleRequirement::aggregate(members.iter().map(|r| &r.vehicle_requirement));
            let total_value: f64 = members.iter().map(|r| r.total_value).sum();

            // 5. 货单合并
            let manifest = Self::consolidate_manifest(&manifest_order);

            // 6. 提交成员与路线状态
            for id in &member_ids {
                if let Some(record) = state.records.get_mut(id) {
                    record.status = RecordStatus::Routed;
                    record.route_id = Some(route_id);
                    record.candidate_id = None;
                }
            }
            let route = state
                .routes
                .get_mut(&route_id)
                .ok_or(EngineError::RouteNotFound(route_id))?;
            route.status = RouteStatus::Approved;
            route.stops = stops.clone();
            route.estimated_duration_min = estimated_duration_min;
            route.vehicle_requirement = vehicle_requirement.clone();
            route.total_value = total_value;

            info!(
                route_id = %route_id,
                members = member_ids.len(),
                total_value = total_value,
                vehicle_class = %vehicle_requirement.vehicle_class,
                estimated_duration_min = estimated_duration_min,
                "路线批准,准备发运交接"
            );

            ConsolidatedLoad {
                route_id,
                bucket_key,
                manifest,
                vehicle_requirement,
                stops,
                estimated_duration_min,
                total_value,
            }
        };

        // 锁外交接;失败只记录,不回滚
        if let Err(err) = self.dispatch.dispatch(&load) {
            warn!(route_id = %route_id, error = %err, "发运交接失败,由适配方重试");
        }

        {
            let mut state = self.lock()?;
            if let Some(route) = state.routes.get_mut(&route_id) {
                route.status = RouteStatus::Dispatched;
            }
        }

        Ok(load)
    }

    /// 驳回路线候选
    ///
    /// 候选废弃,成员占用标记清除 — 成员从未发生状态提交,
    /// 因此驳回是真无操作,成员立即可参与下一轮评估。
    /// 对未知或已终态路线驳回是无变更的错误报告 (幂等)。
    #[instrument(skip(self, reason), fields(route_id = %route_id))]
    pub fn reject(&self, route_id: Uuid, reason: &str) -> EngineResult<()> {
        let mut state = self.lock()?;

        let route = state
            .routes
            .get(&route_id)
            .ok_or(EngineError::RouteNotFound(route_id))?;
        if route.status != RouteStatus::PendingApproval {
            return Err(EngineError::InvalidStateTransition {
                route_id,
                from: route.status.to_string(),
                to: RouteStatus::Rejected.to_string(),
            });
        }
        let member_ids = route.member_ids.clone();

        for id in &member_ids {
            if let Some(record) = state.records.get_mut(id) {
                record.candidate_id = None;
            }
        }
        state.routes.remove(&route_id);

        warn!(
            route_id = %route_id,
            members = member_ids.len(),
            reason = %reason,
            "路线候选驳回,成员回到待整合池"
        );

        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 待整合配送单 (含被候选占用的成员,按摄入时间排序)
    pub fn pending_records(&self) -> EngineResult<Vec<DeliveryRecord>> {
        let state = self.lock()?;
        let mut records: Vec<DeliveryRecord> = state
            .records
            .values()
            .filter(|r| r.status == RecordStatus::Pending)
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.ingested_at, r.id));
        Ok(records)
    }

    /// 查询单条配送单
    pub fn record(&self, record_id: Uuid) -> EngineResult<DeliveryRecord> {
        let state = self.lock()?;
        state
            .records
            .get(&record_id)
            .cloned()
            .ok_or(EngineError::RecordNotFound(record_id))
    }

    /// 查询单条路线
    pub fn route(&self, route_id: Uuid) -> EngineResult<RouteCandidate> {
        let state = self.lock()?;
        state
            .routes
            .get(&route_id)
            .cloned()
            .ok_or(EngineError::RouteNotFound(route_id))
    }

    /// 全部路线 (按创建时间排序)
    pub fn routes(&self) -> EngineResult<Vec<RouteCandidate>> {
        let state = self.lock()?;
        let mut routes: Vec<RouteCandidate> = state.routes.values().cloned().collect();
        routes.sort_by_key(|r| (r.created_at, r.id));
        Ok(routes)
    }

    // ==========================================
    // 快照 (仓储边界)
    // ==========================================

    /// 导出当前状态快照
    ///
    /// 持久化节奏由宿主决定;引擎内存状态仅在本进程生命周期内权威
    pub fn snapshot(&self) -> EngineResult<EngineSnapshot> {
        let state = self.lock()?;
        let mut records: Vec<DeliveryRecord> = state.records.values().cloned().collect();
        records.sort_by_key(|r| (r.ingested_at, r.id));
        let mut routes: Vec<RouteCandidate> = state.routes.values().cloned().collect();
        routes.sort_by_key(|r| (r.created_at, r.id));
        Ok(EngineSnapshot { records, routes })
    }

    /// 从快照恢复状态 (整体替换)
    pub fn restore(&self, snapshot: EngineSnapshot) -> EngineResult<()> {
        let mut state = self.lock()?;
        state.records = snapshot.records.into_iter().map(|r| (r.id, r)).collect();
        state.routes = snapshot.routes.into_iter().map(|r| (r.id, r)).collect();
        info!(
            records = state.records.len(),
            routes = state.routes.len(),
            "引擎状态从快照恢复"
        );
        Ok(())
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn lock(&self) -> EngineResult<MutexGuard<'_, EngineState>> {
        self.inner
            .lock()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))
    }

    /// 冻结一组成员为待审批候选并登记占用标记
    fn build_candidate(
        state: &mut EngineState,
        bucket: RegionBucket,
        member_ids: Vec<Uuid>,
    ) -> EngineResult<RouteCandidate> {
        let route_id = Uuid::new_v4();

        let mut total_value = 0.0;
        let mut requirements: Vec<&VehicleRequirement> = Vec::with_capacity(member_ids.len());
        for id in &member_ids {
            let record = state
                .records
                .get(id)
                .ok_or(EngineError::RecordNotFound(*id))?;
            total_value += record.total_value;
            requirements.push(&record.vehicle_requirement);
        }
        let vehicle_requirement = VehicleRequirement::aggregate(requirements);

        let candidate = RouteCandidate {
            id: route_id,
            bucket_key: bucket.key,
            region_class: bucket.class,
            member_ids: member_ids.clone(),
            total_value,
            vehicle_requirement,
            stops: Vec::new(),
            estimated_duration_min: 0,
            status: RouteStatus::PendingApproval,
            created_at: Utc::now(),
        };

        for id in &member_ids {
            if let Some(record) = state.records.get_mut(id) {
                record.candidate_id = Some(route_id);
            }
        }
        state.routes.insert(route_id, candidate.clone());

        Ok(candidate)
    }

    /// 单停靠估时
    ///
    /// max(下限, 基准 + 递增 × 停靠下标 + 等级调整)
    fn stop_minutes(&self, stop_index: usize, tier: PriorityTier) -> i64 {
        let adjustment = match tier {
            PriorityTier::Urgent => self.config.urgent_stop_adjustment_minutes,
            PriorityTier::High => self.config.high_stop_adjustment_minutes,
            PriorityTier::Normal => 0,
        };
        let raw = self.config.stop_base_minutes
            + self.config.stop_increment_minutes * stop_index as i64
            + adjustment;
        raw.max(self.config.stop_floor_minutes)
    }

    /// 按产品编码合并货单
    ///
    /// 命中编码: 数量与金额累加,追加发票号/配送单 id 回溯;
    /// 未命中: 新增货单行。输出按合计金额降序。
    fn consolidate_manifest(manifest_order: &[DeliveryRecord]) -> Vec<ManifestLine> {
        let mut lines: Vec<ManifestLine> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in manifest_order {
            for item in &record.items {
                match index.get(&item.code) {
                    Some(&i) => {
                        let line = &mut lines[i];
                        line.quantity += item.quantity;
                        line.total_value += item.line_total;
                        if !line.invoice_refs.contains(&record.invoice_number) {
                            line.invoice_refs.push(record.invoice_number.clone());
                        }
                        if !line.record_refs.contains(&record.id) {
                            line.record_refs.push(record.id);
                        }
                    }
                    None => {
                        index.insert(item.code.clone(), lines.len());
                        lines.push(ManifestLine {
                            code: item.code.clone(),
                            description: item.description.clone(),
                            quantity: item.quantity,
                            total_value: item.line_total,
                            invoice_refs: vec![record.invoice_number.clone()],
                            record_refs: vec![record.id],
                        });
                    }
                }
            }
        }

        lines.sort_by(|a, b| {
            b.total_value
                .partial_cmp(&a.total_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        lines
    }
}
