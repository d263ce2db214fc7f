use super::core::PatternEngine;
use crate::config::RbiConfig;
use crate::domain::equipment::{EquipmentData, ExtractedRBIData};
use crate::domain::types::{ConfidenceTier, CriticalityLevel, EquipmentType, PatternType};
use crate::engine::registry::PatternRegistry;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// 测试辅助函数
// ==========================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

fn engine_with(registry: Arc<PatternRegistry>) -> PatternEngine {
    PatternEngine::new(Arc::new(RbiConfig::default()), registry)
}

/// 创建测试用的设备主数据
fn create_test_equipment(
    equipment_id: &str,
    equipment_type: EquipmentType,
    service_type: &str,
    age_years: f64,
) -> EquipmentData {
    EquipmentData {
        equipment_id: equipment_id.to_string(),
        equipment_type,
        service_type: service_type.to_string(),
        installation_date: None,
        age_years: Some(age_years),
        design_pressure_mpa: Some(2.0),
        design_temperature_c: Some(150.0),
        material: Some("316L".to_string()),
        criticality: CriticalityLevel::Medium,
        inventory_size_t: Some(20.0),
    }
}

// ==========================================
// 家族推导
// ==========================================

#[test]
fn test_derive_families_creates_one_family_per_cluster() {
    let registry = Arc::new(PatternRegistry::new());
    let engine = engine_with(registry.clone());

    let population: Vec<EquipmentData> = ["101-E-401A", "101-E-401B", "101-E-401C"]
        .iter()
        .map(|id| create_test_equipment(id, EquipmentType::Exchanger, "crude oil", 12.0))
        .collect();

    let analysis = engine.derive_families(&population);
    assert_eq!(analysis.new_families, 1);
    assert_eq!(analysis.refined_families, 0);
    assert_eq!(registry.family_count(), 1);

    let family = registry.family("101-E-401").unwrap();
    assert_eq!(family.member_equipment.len(), 3);
    assert_eq!(family.equipment_type, EquipmentType::Exchanger);
}

#[test]
fn test_derive_families_is_idempotent() {
    let registry = Arc::new(PatternRegistry::new());
    let engine = engine_with(registry.clone());

    let mut population: Vec<EquipmentData> = ["101-E-401A", "101-E-401B", "101-E-401C"]
        .iter()
        .map(|id| create_test_equipment(id, EquipmentType::Exchanger, "crude oil", 12.0))
        .collect();

    engine.derive_families(&population);
    // 乱序重跑: 只精炼, 不重复建档
    population.reverse();
    let second = engine.derive_families(&population);

    assert_eq!(second.new_families, 0);
    assert_eq!(second.refined_families, 1);
    assert_eq!(registry.family_count(), 1);
}

#[test]
fn test_small_groups_do_not_create_family() {
    let registry = Arc::new(PatternRegistry::new());
    let engine = engine_with(registry.clone());

    let population: Vec<EquipmentData> = ["101-P-7A", "101-P-7B"]
        .iter()
        .map(|id| create_test_equipment(id, EquipmentType::Pump, "amine", 8.0))
        .collect();

    let analysis = engine.derive_families(&population);
    assert_eq!(analysis.new_families, 0);
    assert_eq!(registry.family_count(), 0);
}

// ==========================================
// 匹配与调整量
// ==========================================

#[test]
fn test_family_match_high_tier_for_member_twin() {
    let registry = Arc::new(PatternRegistry::new());
    let engine = engine_with(registry.clone());

    let population: Vec<EquipmentData> = ["101-E-401A", "101-E-401B", "101-E-401C"]
        .iter()
        .map(|id| create_test_equipment(id, EquipmentType::Exchanger, "crude oil", 12.0))
        .collect();
    engine.derive_families(&population);

    // 同型同服务的新设备: 类型/服务 1.0 + 压力包络内 1.0 + 关键度同档 1.0
    let newcomer = create_test_equipment("101-E-401D", EquipmentType::Exchanger, "crude oil", 11.0);
    let analysis = engine.analyze_equipment(&newcomer, None, &[], today());

    let family_match = analysis
        .matches
        .iter()
        .find(|m| m.pattern_type == PatternType::Family)
        .expect("应有家族匹配");
    assert_eq!(family_match.confidence_tier, ConfidenceTier::High);
    assert!(family_match.similarity >= 0.8);
    assert!(analysis.risk_adjustment.confidence_bonus > 0.0);
}

#[test]
fn test_degradation_match_raises_pof() {
    let registry = Arc::new(PatternRegistry::with_builtin_patterns());
    let engine = engine_with(registry);

    // 老龄酸性水换热器 + 检验发现提及机理 => 强劣化匹配
    let equipment =
        create_test_equipment("203-E-12A", EquipmentType::Exchanger, "sour water", 26.0);
    let data = ExtractedRBIData {
        damage_mechanisms: vec!["wet H2S damage".to_string()],
        ..Default::default()
    };

    let analysis = engine.analyze_equipment(&equipment, Some(&data), &[], today());
    let degradation = analysis
        .matches
        .iter()
        .find(|m| m.pattern_type == PatternType::Degradation)
        .expect("应有劣化匹配");
    assert!(degradation.similarity > 0.7);
    assert!(analysis.risk_adjustment.pof_multiplier > 1.0);
    assert!(analysis.risk_adjustment.interval_multiplier < 1.0);
}

#[test]
fn test_degradation_gate_requires_service_match() {
    let registry = Arc::new(PatternRegistry::with_builtin_patterns());
    let engine = engine_with(registry);

    // 服务类型不符 => 不产生劣化匹配
    let equipment =
        create_test_equipment("203-E-12A", EquipmentType::Exchanger, "cooling water", 26.0);
    let analysis = engine.analyze_equipment(&equipment, None, &[], today());

    assert!(analysis
        .matches
        .iter()
        .all(|m| m.pattern_type != PatternType::Degradation));
    assert!((analysis.risk_adjustment.pof_multiplier - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_similarity_always_in_unit_range() {
    let registry = Arc::new(PatternRegistry::with_builtin_patterns());
    let engine = engine_with(registry.clone());

    let population: Vec<EquipmentData> = ["101-E-401A", "101-E-401B", "101-E-401C"]
        .iter()
        .map(|id| create_test_equipment(id, EquipmentType::Exchanger, "sour water", 30.0))
        .collect();
    engine.derive_families(&population);

    let data = ExtractedRBIData {
        damage_mechanisms: vec!["wet H2S damage".to_string()],
        ..Default::default()
    };
    let analysis =
        engine.analyze_equipment(&population[0], Some(&data), &[], today());
    for m in &analysis.matches {
        assert!((0.0..=1.0).contains(&m.similarity));
    }
}
