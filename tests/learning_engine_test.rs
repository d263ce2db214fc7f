// ==========================================
// AdaptiveLearningEngine 集成测试
// ==========================================
// 测试目标: 门控 EMA 反馈 + 批量再学习摘要
// 覆盖范围: 观测门限 / 未知ID跳过 / 新建 vs 精炼计数 /
//           推荐参数趋近观测值
// ==========================================

use chrono::{NaiveDate, Utc};
use plant_integrity_rbi::config::RbiConfig;
use plant_integrity_rbi::domain::equipment::EquipmentData;
use plant_integrity_rbi::domain::family::PatternFeedback;
use plant_integrity_rbi::domain::result::{CalculationResult, CofScores};
use plant_integrity_rbi::domain::types::{
    CalculationLevel, CriticalityLevel, EquipmentType, RiskLevel,
};
use plant_integrity_rbi::engine::{AdaptiveLearningEngine, PatternEngine, PatternRegistry};
use std::sync::Arc;

// ==========================================
// 测试辅助函数
// ==========================================

fn create_engine(registry: Arc<PatternRegistry>) -> AdaptiveLearningEngine {
    AdaptiveLearningEngine::new(Arc::new(RbiConfig::default()), registry)
}

/// 创建测试用的设备主数据
fn create_test_equipment(equipment_id: &str, service_type: &str) -> EquipmentData {
    EquipmentData {
        equipment_id: equipment_id.to_string(),
        equipment_type: EquipmentType::Exchanger,
        service_type: service_type.to_string(),
        installation_date: None,
        age_years: Some(12.0),
        design_pressure_mpa: Some(2.0),
        design_temperature_c: Some(150.0),
        material: Some("316L".to_string()),
        criticality: CriticalityLevel::Medium,
        inventory_size_t: Some(20.0),
    }
}

/// 创建测试用的历史计算结果
fn create_history_result(
    equipment_id: &str,
    risk_level: RiskLevel,
    interval_months: u32,
) -> CalculationResult {
    CalculationResult {
        calculation_id: format!("calc-{}", equipment_id),
        equipment_id: equipment_id.to_string(),
        requested_level: CalculationLevel::Level2,
        achieved_level: CalculationLevel::Level2,
        fallback_occurred: false,
        pof_score: 0.45,
        cof_scores: CofScores {
            safety: 0.45,
            environmental: 0.5,
            economic: 0.55,
        },
        risk_level,
        risk_reason: "历史记录".to_string(),
        confidence_score: 0.7,
        data_quality_score: 0.8,
        inspection_interval_months: interval_months,
        next_inspection_date: NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
        missing_data: Vec::new(),
        estimated_parameters: Vec::new(),
        input_snapshot: serde_json::json!({}),
        calculated_at: Utc::now().naive_utc(),
    }
}

fn sister_population(service_type: &str) -> Vec<EquipmentData> {
    ["101-E-401A", "101-E-401B", "101-E-401C"]
        .iter()
        .map(|id| create_test_equipment(id, service_type))
        .collect()
}

// ==========================================
// 测试用例 1: 门控 EMA (观测不足不更新)
// ==========================================

#[test]
fn test_feedback_ema_is_gated_by_observation_count() {
    let registry = Arc::new(PatternRegistry::new());
    let pattern_engine =
        PatternEngine::new(Arc::new(RbiConfig::default()), registry.clone());
    pattern_engine.derive_families(&sister_population("crude oil"));

    let family = registry.family("101-E-401").expect("家族应已建档");
    assert_eq!(family.observation_count, 1);
    let initial_confidence = family.confidence_score;

    let engine = create_engine(registry.clone());
    let feedback = vec![PatternFeedback {
        equipment_id: "101-E-401A".to_string(),
        pattern_id: "101-E-401".to_string(),
        observed_accuracy: 1.0,
    }];

    // 第一条反馈: 观测数 2 < 3, 置信度不变
    engine.apply_feedback(&feedback);
    let after_first = registry.family("101-E-401").unwrap();
    assert_eq!(after_first.observation_count, 2);
    assert!((after_first.confidence_score - initial_confidence).abs() < 1e-9);

    // 第二条反馈: 观测数到门限, EMA 生效: (0.5 + 1.0) / 2 = 0.75
    engine.apply_feedback(&feedback);
    let after_second = registry.family("101-E-401").unwrap();
    assert_eq!(after_second.observation_count, 3);
    assert!((after_second.confidence_score - 0.75).abs() < 1e-9);
}

// ==========================================
// 测试用例 2: 未知ID跳过, 不报错
// ==========================================

#[test]
fn test_feedback_unknown_pattern_skipped() {
    let registry = Arc::new(PatternRegistry::new());
    let engine = create_engine(registry);

    let summary = engine.apply_feedback(&[PatternFeedback {
        equipment_id: "101-E-401A".to_string(),
        pattern_id: "NO-SUCH-PATTERN".to_string(),
        observed_accuracy: 0.9,
    }]);

    assert_eq!(summary.feedback_applied, 0);
    assert_eq!(summary.skipped.len(), 1);
}

// ==========================================
// 测试用例 3: 观测准确度收敛到 [0,1]
// ==========================================

#[test]
fn test_feedback_accuracy_clamped() {
    let registry = Arc::new(PatternRegistry::with_builtin_patterns());
    let engine = create_engine(registry.clone());

    let feedback = vec![PatternFeedback {
        equipment_id: "203-E-12A".to_string(),
        pattern_id: "DP-AMINE".to_string(),
        observed_accuracy: 5.0, // 越界输入
    }];
    for _ in 0..4 {
        engine.apply_feedback(&feedback);
    }

    let pattern = registry.pattern("DP-AMINE").unwrap();
    assert!((0.0..=1.0).contains(&pattern.confidence_score));
}

// ==========================================
// 测试用例 3b: 预测记录 -> 反馈元组
// ==========================================

#[test]
fn test_feedback_extracted_from_verified_predictions_only() {
    use plant_integrity_rbi::domain::family::{PredictionRecord, VerifiedOutcome};

    let verified = PredictionRecord {
        equipment_id: "101-E-401A".to_string(),
        pattern_id: Some("DP-AMINE".to_string()),
        predicted_risk: RiskLevel::Medium,
        predicted_interval_months: 36,
        predicted_at: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        verified_outcome: Some(VerifiedOutcome {
            observed_risk: RiskLevel::Medium,
            accuracy: 0.9,
            verified_at: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        }),
    };
    let unverified = PredictionRecord {
        verified_outcome: None,
        ..verified.clone()
    };
    let unlinked = PredictionRecord {
        pattern_id: None,
        ..verified.clone()
    };

    let feedback =
        AdaptiveLearningEngine::feedback_from_predictions(&[verified, unverified, unlinked]);
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0].pattern_id, "DP-AMINE");
    assert!((feedback[0].observed_accuracy - 0.9).abs() < 1e-9);
}

// ==========================================
// 测试用例 4: 批量再学习 (新建 vs 精炼)
// ==========================================

#[test]
fn test_learn_from_corpus_counts_new_then_refined() {
    let registry = Arc::new(PatternRegistry::new());
    let engine = create_engine(registry.clone());

    let population = sister_population("crude oil");
    let history: Vec<CalculationResult> = population
        .iter()
        .map(|e| create_history_result(&e.equipment_id, RiskLevel::Medium, 36))
        .collect();

    // 第一轮: 全部新建
    let first = engine.learn_from_corpus(&population, &history);
    assert_eq!(first.new_families, 1);
    assert_eq!(first.refined_families, 0);
    assert_eq!(first.new_patterns, 1);
    assert_eq!(first.refined_patterns, 0);

    // 第二轮同一语料: 全部精炼, 不重复建档
    let second = engine.learn_from_corpus(&population, &history);
    assert_eq!(second.new_families, 0);
    assert_eq!(second.refined_families, 1);
    assert_eq!(second.new_patterns, 0);
    assert_eq!(second.refined_patterns, 1);

    assert_eq!(registry.family_count(), 1, "同一聚类只允许一条家族记录");
}

// ==========================================
// 测试用例 5: 推荐参数趋近观测值 + 家族/模式关联
// ==========================================

#[test]
fn test_corpus_learning_nudges_parameters_and_links_patterns() {
    let registry = Arc::new(PatternRegistry::new());
    let engine = create_engine(registry.clone());

    let population = sister_population("crude oil");
    let history: Vec<CalculationResult> = population
        .iter()
        .map(|e| create_history_result(&e.equipment_id, RiskLevel::High, 12))
        .collect();

    engine.learn_from_corpus(&population, &history);

    let family = registry.family("101-E-401").expect("家族应已建档");
    let recommended = family
        .recommended_parameters
        .get("inspection_interval_months")
        .expect("推荐周期应已写入");
    // 首轮直接采用观测均值 12
    assert!((recommended - 12.0).abs() < 1e-9);
    assert_eq!(family.typical_risk, Some(RiskLevel::High));
    assert!(
        family
            .degradation_patterns
            .contains(&"DP-CRUDE-OIL".to_string()),
        "家族应关联服务劣化模式"
    );

    let pattern = registry.pattern("DP-CRUDE-OIL").expect("模式应已建档");
    assert!(!pattern.age_rate_curve.is_empty());
    assert!((0.0..=1.0).contains(&pattern.confidence_score));
}
