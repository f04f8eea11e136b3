// ==========================================
// ConsolidationEngine 整合流程集成测试
// ==========================================
// 测试目标: 验证摄入 → 评估 → 审批/驳回 → 发运全流程
// 覆盖范围: 起批阈值、收尾时段、候选占用、驳回无操作、交接失败
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use dock_delivery_engine::{
    ConsolidationConfig, ConsolidationEngine, DeliveryDraft, EngineError, LineItem, RawAddress,
    RecordStatus, RecordingDispatchAdapter, RouteStatus,
};

// ==========================================
// 测试辅助函数
// ==========================================

/// 创建引擎与记录适配器
fn create_engine() -> (ConsolidationEngine, Arc<RecordingDispatchAdapter>) {
    dock_delivery_engine::logging::init_test();
    let adapter = Arc::new(RecordingDispatchAdapter::new());
    let engine = ConsolidationEngine::new(ConsolidationConfig::default(), adapter.clone());
    (engine, adapter)
}

/// 创建测试用的配送单草稿
fn create_draft(invoice: &str, city: &str, state: &str, value: f64) -> DeliveryDraft {
    DeliveryDraft {
        invoice_number: invoice.to_string(),
        issue_date: Some(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()),
        delivery_date: None,
        invoice_address: RawAddress {
            street: "Av. Industrial".to_string(),
            number: "500".to_string(),
            neighborhood: "Distrito".to_string(),
            city: city.to_string(),
            state: state.to_string(),
            postal_code: "01000-000".to_string(),
        },
        delivery_address_override: None,
        items: vec![LineItem::new("PROD001", "Carga geral", 1.0, "UN", value)],
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn at_hour(hour: u32) -> NaiveDateTime {
    today().and_hms_opt(hour, 0, 0).unwrap()
}

// ==========================================
// 测试用例 1: 首府桶起批 (场景 A)
// ==========================================

#[test]
fn test_capital_bucket_batch_formation() {
    println!("\n=== 测试：首府桶三单起批 ===");

    let (engine, _) = create_engine();
    engine
        .ingest(create_draft("NF-001", "São Paulo", "SP", 10_000.0), today())
        .unwrap();
    engine
        .ingest(create_draft("NF-002", "São Paulo", "SP", 20_000.0), today())
        .unwrap();
    engine
        .ingest(create_draft("NF-003", "São Paulo", "SP", 15_000.0), today())
        .unwrap();

    // 10:00 评估,首府桶阈值 3 恰好满足
    let created = engine.evaluate(at_hour(10)).unwrap();

    println!("✓ 评估完成");
    println!("  - 新建候选数: {}", created.len());
    println!("  - 候选聚合金额: {}", created[0].total_value);

    assert_eq!(created.len(), 1, "应该恰好创建1个候选");
    let candidate = &created[0];
    assert_eq!(candidate.bucket_key, "SP-Capital");
    assert_eq!(candidate.member_count(), 3);
    assert_eq!(candidate.total_value, 45_000.0, "聚合金额应该是45000");
    assert_eq!(candidate.status, RouteStatus::PendingApproval);

    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 2: 收尾时段内陆单单起批 (场景 B)
// ==========================================

#[test]
fn test_interior_single_record_after_cutoff() {
    println!("\n=== 测试：收尾时段内陆桶单单起批 ===");

    let (engine, _) = create_engine();
    engine
        .ingest(create_draft("NF-101", "Springfield", "XX", 500.0), today())
        .unwrap();

    // 15:00 评估,内陆桶阈值 2,不起批
    let created = engine.evaluate(at_hour(15)).unwrap();
    assert!(created.is_empty(), "常规时段单单不应起批");

    // 17:00 评估,收尾时段内陆桶阈值降为 1
    let created = engine.evaluate(at_hour(17)).unwrap();

    println!("✓ 收尾时段评估完成");
    println!("  - 新建候选数: {}", created.len());

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].bucket_key, "XX-Interior");
    assert_eq!(created[0].member_count(), 1);

    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 3: 审批全流程与发运交接
// ==========================================

#[test]
fn test_approve_dispatches_load() {
    println!("\n=== 测试：审批全流程 ===");

    let (engine, adapter) = create_engine();
    for i in 1..=3 {
        engine
            .ingest(
                create_draft(&format!("NF-20{}", i), "São Paulo", "SP", 10_000.0 * i as f64),
                today(),
            )
            .unwrap();
    }
    let candidate = engine.evaluate(at_hour(10)).unwrap().remove(0);

    // 执行审批
    let load = engine.approve(candidate.id).unwrap();

    println!("✓ 审批完成");
    println!("  - 停靠数: {}", load.stops.len());
    println!("  - 总时长: {} 分钟", load.estimated_duration_min);
    println!("  - 货单行数: {}", load.manifest.len());

    // 停靠序号必须是 1..N 的排列
    let mut seq: Vec<u32> = load.stops.iter().map(|s| s.sequence_no).collect();
    seq.sort_unstable();
    assert_eq!(seq, vec![1, 2, 3], "停靠序号应该是1..N排列");

    // 全员 NORMAL: 停靠估时 45 / 70 / 95,加 30 准备 = 240
    assert_eq!(load.estimated_duration_min, 240, "总时长应该是240分钟");

    // 聚合金额守恒: 载货 = 候选 = 货单行合计
    assert_eq!(load.total_value, 60_000.0);
    let manifest_total: f64 = load.manifest.iter().map(|l| l.total_value).sum();
    assert_eq!(manifest_total, load.total_value, "货单行合计应等于载货金额");

    // 成员进入 ROUTED 并关联路线
    for stop in &load.stops {
        let record = engine.record(stop.record_id).unwrap();
        assert_eq!(record.status, RecordStatus::Routed);
        assert_eq!(record.route_id, Some(candidate.id));
        assert_eq!(record.candidate_id, None);
    }

    // 路线终态 DISPATCHED,适配器收到载货
    let route = engine.route(candidate.id).unwrap();
    assert_eq!(route.status, RouteStatus::Dispatched);
    assert_eq!(adapter.dispatched_loads().len(), 1);

    // 已发运成员不再参与评估
    let again = engine.evaluate(at_hour(10)).unwrap();
    assert!(again.is_empty());

    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 4: 驳回是真无操作
// ==========================================

#[test]
fn test_reject_returns_members_to_pool() {
    println!("\n=== 测试：驳回后成员回池 ===");

    let (engine, adapter) = create_engine();
    for i in 1..=3 {
        engine
            .ingest(create_draft(&format!("NF-30{}", i), "São Paulo", "SP", 1_000.0), today())
            .unwrap();
    }
    let candidate = engine.evaluate(at_hour(10)).unwrap().remove(0);
    let member_ids = candidate.member_ids.clone();

    // 候选待审批期间成员被占用,不得重复分组
    assert!(engine.evaluate(at_hour(10)).unwrap().is_empty());

    // 执行驳回
    engine.reject(candidate.id, "车辆不可用").unwrap();

    println!("✓ 驳回完成");

    // 成员全程 PENDING,占用标记清除
    for id in &member_ids {
        let record = engine.record(*id).unwrap();
        assert_eq!(record.status, RecordStatus::Pending);
        assert_eq!(record.candidate_id, None);
        assert_eq!(record.route_id, None);
    }

    // 候选废弃
    let err = engine.route(candidate.id).unwrap_err();
    assert!(matches!(err, EngineError::RouteNotFound(_)));

    // 成员立即可重新起批,且不触发任何发运
    let recreated = engine.evaluate(at_hour(10)).unwrap();
    assert_eq!(recreated.len(), 1);
    assert_eq!(recreated[0].member_count(), 3);
    assert!(adapter.dispatched_loads().is_empty());

    // 重复驳回同一 id: 无变更的错误报告
    let err = engine.reject(candidate.id, "novamente").unwrap_err();
    assert!(matches!(err, EngineError::RouteNotFound(_)));

    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 5: 已发运路线不可再审批/驳回
// ==========================================

#[test]
fn test_terminal_route_state_transitions_rejected() {
    println!("\n=== 测试：终态路线状态保护 ===");

    let (engine, _) = create_engine();
    for i in 1..=3 {
        engine
            .ingest(create_draft(&format!("NF-40{}", i), "São Paulo", "SP", 1_000.0), today())
            .unwrap();
    }
    let candidate = engine.evaluate(at_hour(10)).unwrap().remove(0);
    engine.approve(candidate.id).unwrap();

    let err = engine.approve(candidate.id).unwrap_err();
    assert!(matches!(err, EngineError::InvalidStateTransition { .. }));

    let err = engine.reject(candidate.id, "tarde demais").unwrap_err();
    assert!(matches!(err, EngineError::InvalidStateTransition { .. }));

    // 状态未被破坏
    assert_eq!(engine.route(candidate.id).unwrap().status, RouteStatus::Dispatched);

    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 6: 交接失败不回滚
// ==========================================

#[test]
fn test_dispatch_failure_does_not_roll_back() {
    println!("\n=== 测试：交接失败不回滚 ===");

    let adapter = Arc::new(RecordingDispatchAdapter::failing());
    let engine = ConsolidationEngine::new(ConsolidationConfig::default(), adapter.clone());

    for i in 1..=3 {
        engine
            .ingest(create_draft(&format!("NF-50{}", i), "São Paulo", "SP", 1_000.0), today())
            .unwrap();
    }
    let candidate = engine.evaluate(at_hour(10)).unwrap().remove(0);

    // 适配器固定失败,审批依然成功返回载货
    let load = engine.approve(candidate.id).unwrap();
    assert_eq!(load.stops.len(), 3);

    println!("✓ 审批在交接失败下仍成功");

    // 路线仍结束于 DISPATCHED,成员仍 ROUTED
    assert_eq!(engine.route(candidate.id).unwrap().status, RouteStatus::Dispatched);
    for stop in &load.stops {
        assert_eq!(engine.record(stop.record_id).unwrap().status, RecordStatus::Routed);
    }
    assert!(adapter.dispatched_loads().is_empty());

    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 7: 跨桶互不干扰
// ==========================================

#[test]
fn test_buckets_evaluated_independently() {
    println!("\n=== 测试：跨桶独立评估 ===");

    let (engine, _) = create_engine();
    // SP 首府 3 单 (达阈值) + MG 内陆 1 单 (不达)
    for i in 1..=3 {
        engine
            .ingest(create_draft(&format!("NF-60{}", i), "São Paulo", "SP", 1_000.0), today())
            .unwrap();
    }
    engine
        .ingest(create_draft("NF-604", "Uberlândia", "MG", 1_000.0), today())
        .unwrap();

    let created = engine.evaluate(at_hour(10)).unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].bucket_key, "SP-Capital");

    // 内陆单保持待整合
    let pending = engine.pending_records().unwrap();
    let free: Vec<_> = pending.iter().filter(|r| r.candidate_id.is_none()).collect();
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].invoice_number, "NF-604");

    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 8: 操作员强制起批
// ==========================================

#[test]
fn test_force_create_candidate_flow() {
    println!("\n=== 测试：操作员强制起批 ===");

    let (engine, _) = create_engine();
    let id = engine
        .ingest(create_draft("NF-701", "Lins", "SP", 2_500.0), today())
        .unwrap();

    // 单单不达内陆阈值,操作员显式强制
    assert!(engine.evaluate(at_hour(10)).unwrap().is_empty());
    let candidate = engine.force_create_candidate(&[id]).unwrap();
    assert_eq!(candidate.bucket_key, "SP-Interior");
    assert_eq!(candidate.total_value, 2_500.0);

    // 强制起批的候选走同一审批通道
    let load = engine.approve(candidate.id).unwrap();
    assert_eq!(load.stops.len(), 1);
    assert_eq!(engine.record(id).unwrap().status, RecordStatus::Routed);

    println!("=== 测试通过 ===\n");
}
