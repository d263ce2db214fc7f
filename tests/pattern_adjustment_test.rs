// ==========================================
// 模式智能 × 计算器 联动集成测试
// ==========================================
// 测试目标: 模式引擎的调整量真实作用于计算结果
// 覆盖范围: 劣化匹配收紧周期抬升 PoF /
//           家族高相似提升置信度 /
//           注册表变更使计算缓存失效
// ==========================================

use chrono::NaiveDate;
use plant_integrity_rbi::config::RbiConfig;
use plant_integrity_rbi::domain::equipment::{EquipmentData, ExtractedRBIData};
use plant_integrity_rbi::domain::types::{CalculationLevel, CriticalityLevel, EquipmentType};
use plant_integrity_rbi::engine::{PatternEngine, PatternRegistry, RbiCalculator};
use std::sync::Arc;

// ==========================================
// 测试辅助函数
// ==========================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

/// 创建测试用的酸性水换热器
fn create_sour_water_exchanger(equipment_id: &str) -> EquipmentData {
    EquipmentData {
        equipment_id: equipment_id.to_string(),
        equipment_type: EquipmentType::Exchanger,
        service_type: "sour water".to_string(),
        installation_date: None,
        age_years: Some(26.0),
        design_pressure_mpa: Some(2.0),
        design_temperature_c: Some(150.0),
        material: Some("CS".to_string()),
        criticality: CriticalityLevel::Medium,
        inventory_size_t: Some(5.0),
    }
}

fn create_finding_data() -> ExtractedRBIData {
    ExtractedRBIData {
        corrosion_rate_mm_per_year: Some(0.08),
        damage_mechanisms: vec!["wet H2S damage".to_string()],
        // 上次检验已超 90 天, 时效分处于衰减段,
        // 置信度未被顶到 1.0, 便于观察加成
        last_inspection_date: NaiveDate::from_ymd_opt(2025, 11, 1),
        ..Default::default()
    }
}

// ==========================================
// 测试用例 1: 劣化匹配收紧周期
// ==========================================

#[test]
fn test_degradation_match_tightens_interval() {
    let equipment = create_sour_water_exchanger("203-E-12A");
    let data = create_finding_data();

    // 基线: 空注册表, 无模式调整
    let plain = RbiCalculator::new(RbiConfig::default(), Arc::new(PatternRegistry::new()))
        .unwrap()
        .calculate(
            Some(&equipment),
            Some(&data),
            Some(CalculationLevel::Level2),
            &[],
            today(),
        )
        .unwrap();

    // 对照: 内置劣化模式命中 (老龄 + 机理提及 => 相似度 > 0.7)
    let informed = RbiCalculator::new(
        RbiConfig::default(),
        Arc::new(PatternRegistry::with_builtin_patterns()),
    )
    .unwrap()
    .calculate(
        Some(&equipment),
        Some(&data),
        Some(CalculationLevel::Level2),
        &[],
        today(),
    )
    .unwrap();

    assert!(
        informed.pof_score > plain.pof_score,
        "劣化匹配应抬升 PoF: {} -> {}",
        plain.pof_score,
        informed.pof_score
    );
    assert!(
        informed.inspection_interval_months <= plain.inspection_interval_months,
        "劣化匹配不得放宽周期"
    );
    assert!((0.0..=1.0).contains(&informed.pof_score));
}

// ==========================================
// 测试用例 2: 家族高相似提升置信度
// ==========================================

#[test]
fn test_family_membership_raises_confidence() {
    let registry = Arc::new(PatternRegistry::new());
    let pattern_engine = PatternEngine::new(Arc::new(RbiConfig::default()), registry.clone());

    // 建档三台姊妹设备
    let population: Vec<EquipmentData> = ["203-E-12A", "203-E-12B", "203-E-12C"]
        .iter()
        .map(|id| create_sour_water_exchanger(id))
        .collect();
    pattern_engine.derive_families(&population);

    let calculator = RbiCalculator::new(RbiConfig::default(), registry).unwrap();
    let equipment = create_sour_water_exchanger("203-E-12D");
    let data = create_finding_data();

    let with_family = calculator
        .calculate(
            Some(&equipment),
            Some(&data),
            Some(CalculationLevel::Level2),
            &[],
            today(),
        )
        .unwrap();

    let without_family =
        RbiCalculator::new(RbiConfig::default(), Arc::new(PatternRegistry::new()))
            .unwrap()
            .calculate(
                Some(&equipment),
                Some(&data),
                Some(CalculationLevel::Level2),
                &[],
                today(),
            )
            .unwrap();

    assert!(
        with_family.confidence_score > without_family.confidence_score,
        "家族高相似应带来置信度加成"
    );
}

// ==========================================
// 测试用例 3: 注册表变更使缓存失效
// ==========================================

#[test]
fn test_registry_mutation_invalidates_cache() {
    let registry = Arc::new(PatternRegistry::new());
    let calculator = RbiCalculator::new(RbiConfig::default(), registry.clone()).unwrap();
    let equipment = create_sour_water_exchanger("203-E-12A");

    let first = calculator
        .calculate(Some(&equipment), None, None, &[], today())
        .unwrap();
    // 注册表学习到新模式 => 代数前进, 旧缓存键失配
    let pattern_engine = PatternEngine::new(Arc::new(RbiConfig::default()), registry.clone());
    let population: Vec<EquipmentData> = ["203-E-12A", "203-E-12B", "203-E-12C"]
        .iter()
        .map(|id| create_sour_water_exchanger(id))
        .collect();
    pattern_engine.derive_families(&population);

    let second = calculator
        .calculate(Some(&equipment), None, None, &[], today())
        .unwrap();

    assert_ne!(
        first.calculation_id, second.calculation_id,
        "注册表变更后必须重算"
    );
}
