// ==========================================
// 设备完整性管理系统 - 等级2 计算 (加权评分表)
// ==========================================
// 准入: 至少一项检验发现
//       (腐蚀速率 / 涂层状态 / 已识别损伤机理)
// PoF: 三分项加权和; CoF: 安全/环境/经济三维
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::{EquipmentData, ExtractedRBIData};
use crate::domain::result::CofScores;
use crate::domain::types::{clamp01, CalculationLevel, CriticalityLevel};
use crate::engine::error::RbiError;

/// 等级2 计算输出
pub(super) struct Level2Outcome {
    pub pof: f64,
    /// 分项说明 (可解释性)
    pub components: Vec<String>,
}

/// 等级2 PoF 计算
///
/// # 规则
/// - 腐蚀速率: 阈值分档评分, 超红线 (0.2 mm/年) 即满分
/// - 涂层状态: 劣化分; 缺测按中性分
/// - 损伤机理: 每条计分, 封顶 1.0
pub(super) fn compute(
    data: Option<&ExtractedRBIData>,
    config: &RbiConfig,
) -> Result<Level2Outcome, RbiError> {
    let missing_all = || RbiError::DataInsufficient {
        level: CalculationLevel::Level2,
        missing: vec![
            "corrosion_rate_mm_per_year".to_string(),
            "coating_condition".to_string(),
            "damage_mechanisms".to_string(),
        ],
    };

    let Some(data) = data else {
        return Err(missing_all());
    };
    if !data.has_any_finding() {
        return Err(missing_all());
    }

    let l2 = &config.level2;
    let mut components = Vec::new();

    // 分项1: 腐蚀速率
    let corrosion_score = match data.corrosion_rate_mm_per_year {
        Some(rate) => {
            let score = if rate > l2.corrosion_high_threshold {
                1.0
            } else if rate > l2.corrosion_medium_threshold {
                0.7
            } else if rate > l2.corrosion_low_threshold {
                0.4
            } else {
                // 低速率区线性压缩到 [0, 0.2]
                clamp01(rate / l2.corrosion_low_threshold) * 0.2
            };
            components.push(format!("corrosion {:.3} mm/y => {:.2}", rate, score));
            score
        }
        None => {
            components.push(format!(
                "corrosion 缺测 => 中性 {:.2}",
                l2.neutral_component_score
            ));
            l2.neutral_component_score
        }
    };

    // 分项2: 涂层状态
    let coating_score = match data.coating_condition {
        Some(condition) => {
            let score = condition.degradation_score();
            components.push(format!("coating {} => {:.2}", condition, score));
            score
        }
        None => {
            components.push(format!(
                "coating 缺测 => 中性 {:.2}",
                l2.neutral_component_score
            ));
            l2.neutral_component_score
        }
    };

    // 分项3: 损伤机理
    let damage_score = clamp01(data.damage_mechanisms.len() as f64 * l2.damage_mechanism_score);
    if !data.damage_mechanisms.is_empty() {
        components.push(format!(
            "damage mechanisms x{} => {:.2}",
            data.damage_mechanisms.len(),
            damage_score
        ));
    }

    let pof = clamp01(
        l2.corrosion_weight * corrosion_score
            + l2.coating_weight * coating_score
            + l2.damage_weight * damage_score,
    );

    Ok(Level2Outcome { pof, components })
}

/// 三维失效后果分 (所有等级共用, 仅依赖主数据)
///
/// # 规则
/// - 安全: 关键度基础分 + 高压加成
/// - 环境: 介质危害分级
/// - 经济: 存量分档 + 关键度 CRITICAL 加成
pub(super) fn consequence_scores(equipment: &EquipmentData, config: &RbiConfig) -> CofScores {
    let l2 = &config.level2;

    let pressure_bonus = match equipment.design_pressure_mpa {
        Some(p) if p > l2.high_pressure_mpa => l2.high_pressure_bonus,
        _ => 0.0,
    };
    let safety = clamp01(equipment.criticality.safety_score() + pressure_bonus);

    let environmental = service_environmental_score(&equipment.service_type);

    let inventory_score = match equipment.inventory_size_t {
        None => 0.3,
        Some(t) if t < 10.0 => 0.3,
        Some(t) if t < 100.0 => 0.55,
        Some(_) => 0.8,
    };
    let critical_bonus = if equipment.criticality == CriticalityLevel::Critical {
        0.1
    } else {
        0.0
    };
    let economic = clamp01(inventory_score + critical_bonus);

    CofScores {
        safety,
        environmental,
        economic,
    }
}

/// 介质环境危害分级
pub(super) fn service_environmental_score(service_type: &str) -> f64 {
    let service = service_type.to_ascii_lowercase();
    const HAZARDOUS: [&str; 6] = ["sour", "acid", "h2s", "caustic", "amine", "hf"];
    const HYDROCARBON: [&str; 5] = ["crude", "diesel", "naphtha", "gas", "lpg"];
    const BENIGN: [&str; 4] = ["water", "steam", "air", "nitrogen"];

    if HAZARDOUS.iter().any(|k| service.contains(k)) {
        0.7
    } else if HYDROCARBON.iter().any(|k| service.contains(k)) {
        0.5
    } else if BENIGN.iter().any(|k| service.contains(k)) {
        0.25
    } else {
        0.35
    }
}
