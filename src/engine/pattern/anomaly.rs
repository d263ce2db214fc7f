// ==========================================
// 设备完整性管理系统 - 异常检测
// ==========================================
// 职责: 标记与已知模式/自身历史不符的设备
// 输出: AnomalyFlag 列表 (每条带可解释原因)
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::EquipmentData;
use crate::domain::family::{AnomalyFlag, PatternMatch};
use crate::domain::result::CalculationResult;
use crate::domain::types::{AnomalyKind, PatternType};
use chrono::NaiveDate;

/// 异常检测
///
/// # 规则
/// - 历史风险等级档位差 >= 阈值 => RISK_VARIANCE
/// - 最近 N 次置信度均低于阈值 => PERSISTENT_LOW_CONFIDENCE
/// - 注册表非空但无任何家族匹配 => NO_FAMILY_FIT
/// - 年龄超出该类型典型服役包络 => AGE_OUTSIDE_ENVELOPE
pub(super) fn detect(
    equipment: &EquipmentData,
    history: &[CalculationResult],
    matches: &[PatternMatch],
    family_count: usize,
    config: &RbiConfig,
    today: NaiveDate,
) -> Vec<AnomalyFlag> {
    let mut flags = Vec::new();
    let p = &config.pattern;

    // 1. 自身历史风险波动
    if history.len() >= 2 {
        let ranks: Vec<i32> = history.iter().map(|r| r.risk_level.rank()).collect();
        let min = ranks.iter().min().copied().unwrap_or(0);
        let max = ranks.iter().max().copied().unwrap_or(0);
        if max - min >= p.risk_variance_threshold {
            flags.push(AnomalyFlag {
                kind: AnomalyKind::RiskVariance,
                detail: format!(
                    "历史风险等级波动 {} 档 (阈值 {})",
                    max - min,
                    p.risk_variance_threshold
                ),
            });
        }
    }

    // 2. 置信度持续偏低
    if history.len() >= p.low_confidence_window {
        let recent = &history[history.len() - p.low_confidence_window..];
        if recent
            .iter()
            .all(|r| r.confidence_score < p.low_confidence_threshold)
        {
            flags.push(AnomalyFlag {
                kind: AnomalyKind::PersistentLowConfidence,
                detail: format!(
                    "最近 {} 次计算置信度均低于 {:.2}",
                    p.low_confidence_window, p.low_confidence_threshold
                ),
            });
        }
    }

    // 3. 与所有已知家族都不匹配
    let has_family_match = matches
        .iter()
        .any(|m| m.pattern_type == PatternType::Family);
    if family_count > 0 && !has_family_match {
        flags.push(AnomalyFlag {
            kind: AnomalyKind::NoFamilyFit,
            detail: format!("与 {} 个已知家族均不匹配", family_count),
        });
    }

    // 4. 年龄超出典型服役包络
    if let Some(age) = equipment.resolved_age_years(today) {
        let envelope = equipment.equipment_type.typical_service_life_years();
        if age > envelope {
            flags.push(AnomalyFlag {
                kind: AnomalyKind::AgeOutsideEnvelope,
                detail: format!(
                    "设备年龄 {:.0} 年超出 {} 典型服役寿命 {:.0} 年",
                    age, equipment.equipment_type, envelope
                ),
            });
        }
    }

    flags
}
