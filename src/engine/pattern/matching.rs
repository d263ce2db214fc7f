// ==========================================
// 设备完整性管理系统 - 模式匹配评分
// ==========================================
// 家族相似度: 类型/服务精确匹配 + 压力等级相容 +
//             关键度相容 的加权平均
// 劣化适用度: 服务+类型门控, 年龄曲线与机理提及加权
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::{EquipmentData, ExtractedRBIData};
use crate::domain::family::{DegradationPattern, EquipmentFamily};
use crate::domain::types::clamp01;
use chrono::NaiveDate;

/// 家族相似度评分明细
pub(super) struct FamilyScore {
    pub similarity: f64,
    pub matching_attributes: Vec<String>,
    pub deviations: Vec<String>,
}

/// 家族相似度
///
/// # 规则
/// - 类型/服务: 二元精确匹配
/// - 压力: 设备压力落入家族包络 => 1.0, 否则按偏离衰减; 缺测 => 0.5 中性
/// - 关键度: 同档 1.0, 邻档 0.6, 其余 0.2; 家族无典型档 => 0.5 中性
pub(super) fn family_similarity(
    equipment: &EquipmentData,
    family: &EquipmentFamily,
    config: &RbiConfig,
) -> FamilyScore {
    let mut matching = Vec::new();
    let mut deviations = Vec::new();

    // 类型/服务精确匹配 (二元)
    let type_service = if equipment.equipment_type == family.equipment_type
        && family.service_types.contains(&equipment.service_type)
    {
        matching.push(format!(
            "type/service: {} / {}",
            equipment.equipment_type, equipment.service_type
        ));
        1.0
    } else {
        deviations.push(format!(
            "type/service 不一致: {} / {}",
            equipment.equipment_type, equipment.service_type
        ));
        0.0
    };

    // 压力等级相容性
    let pressure = match (
        equipment.design_pressure_mpa,
        family.common_characteristics.design_pressure_range_mpa,
    ) {
        (Some(p), Some((lo, hi))) => {
            if p >= lo && p <= hi {
                matching.push(format!("design_pressure {:.1} MPa 在家族包络内", p));
                1.0
            } else {
                let span = (hi - lo).max(0.5);
                let distance = if p < lo { lo - p } else { p - hi };
                let score = clamp01(1.0 - distance / span);
                deviations.push(format!(
                    "design_pressure {:.1} MPa 偏离包络 [{:.1}, {:.1}]",
                    p, lo, hi
                ));
                score
            }
        }
        // 任一侧缺测: 中性分
        _ => 0.5,
    };

    // 关键度相容性
    let criticality = match family.common_characteristics.typical_criticality {
        Some(typical) => {
            let gap = (equipment.criticality.rank() - typical.rank()).abs();
            match gap {
                0 => {
                    matching.push(format!("criticality {}", equipment.criticality));
                    1.0
                }
                1 => 0.6,
                _ => {
                    deviations.push(format!(
                        "criticality {} 与家族典型 {} 相差 {} 档",
                        equipment.criticality, typical, gap
                    ));
                    0.2
                }
            }
        }
        None => 0.5,
    };

    let p = &config.pattern;
    let similarity = clamp01(
        p.type_service_weight * type_service
            + p.pressure_weight * pressure
            + p.criticality_weight * criticality,
    );

    FamilyScore {
        similarity,
        matching_attributes: matching,
        deviations,
    }
}

/// 劣化模式适用度评分明细
pub(super) struct DegradationScore {
    pub similarity: f64,
    pub matching_attributes: Vec<String>,
    pub deviations: Vec<String>,
    pub recommendations: Vec<String>,
}

/// 劣化模式适用度
///
/// # 规则
/// - 门控: 服务类型与设备类型必须同时匹配, 否则不适用
/// - 年龄曲线: 在模式自带的年龄→速率曲线上插值
/// - 机理提及: 检验发现/损伤机理提到模式机理名 => 加分
pub(super) fn degradation_applicability(
    equipment: &EquipmentData,
    data: Option<&ExtractedRBIData>,
    pattern: &DegradationPattern,
    today: NaiveDate,
) -> Option<DegradationScore> {
    // 服务 + 类型 双门控
    if !equipment
        .service_type
        .eq_ignore_ascii_case(&pattern.service_type)
    {
        return None;
    }
    if !pattern.equipment_types.contains(&equipment.equipment_type) {
        return None;
    }

    let mut matching = vec![format!(
        "service/type: {} / {}",
        pattern.service_type, equipment.equipment_type
    )];
    let mut deviations = Vec::new();

    // 年龄→劣化速率曲线
    let curve_factor = match equipment.resolved_age_years(today) {
        Some(age) => {
            let factor = pattern.rate_factor_at_age(age);
            matching.push(format!(
                "age {:.0}y => rate_factor {:.2}",
                age, factor
            ));
            factor
        }
        None => {
            deviations.push("设备年龄未知, 年龄曲线按中性计".to_string());
            0.5
        }
    };

    // 历史发现是否提及该机理
    let mechanism = pattern.damage_mechanism.to_ascii_lowercase();
    let mentioned = data
        .map(|d| {
            d.damage_mechanisms
                .iter()
                .chain(d.findings.iter())
                .any(|s| s.to_ascii_lowercase().contains(&mechanism))
        })
        .unwrap_or(false);
    if mentioned {
        matching.push(format!("检验发现提及机理: {}", pattern.damage_mechanism));
    }

    let similarity = clamp01(0.45 + 0.3 * curve_factor + if mentioned { 0.25 } else { 0.0 });

    Some(DegradationScore {
        similarity,
        matching_attributes: matching,
        deviations,
        recommendations: pattern.mitigation_strategies.clone(),
    })
}
