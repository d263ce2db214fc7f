// ==========================================
// 设备完整性管理系统 - 模式识别引擎核心
// ==========================================
// 职责: 单台分析 (匹配+异常+调整量) 与
//       全量家族推导 (先分组后建档)
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::{EquipmentData, ExtractedRBIData};
use crate::domain::family::{
    EquipmentFamily, FamilyCharacteristics, PatternAnalysisResult, PatternMatch, RiskAdjustment,
};
use crate::domain::result::CalculationResult;
use crate::domain::types::{clamp01, ConfidenceTier, CriticalityLevel, EquipmentType, PatternType};
use crate::engine::registry::PatternRegistry;
use crate::engine::tag::{TagGroup, TagGroupingAnalyzer};
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use super::{anomaly, matching};

// ==========================================
// PopulationAnalysis - 全量家族推导结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PopulationAnalysis {
    /// 聚类分组 (含单例)
    pub groups: Vec<TagGroup>,
    /// 新建家族数
    pub new_families: usize,
    /// 精炼家族数
    pub refined_families: usize,
}

// ==========================================
// PatternEngine - 模式识别引擎
// ==========================================
pub struct PatternEngine {
    config: Arc<RbiConfig>,
    registry: Arc<PatternRegistry>,
    grouping: TagGroupingAnalyzer,
}

impl PatternEngine {
    pub fn new(config: Arc<RbiConfig>, registry: Arc<PatternRegistry>) -> Self {
        Self {
            config,
            registry,
            grouping: TagGroupingAnalyzer::new(),
        }
    }

    pub fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    // ==========================================
    // 单台分析
    // ==========================================

    /// 分析单台设备: 家族/劣化匹配 + 异常 + 调整量
    ///
    /// 只读注册表, 不做任何变更 (计算路径可并行)
    pub fn analyze_equipment(
        &self,
        equipment: &EquipmentData,
        data: Option<&ExtractedRBIData>,
        history: &[CalculationResult],
        today: NaiveDate,
    ) -> PatternAnalysisResult {
        let mut matches = Vec::new();
        let p = &self.config.pattern;

        // 1. 家族匹配
        for family in self.registry.families() {
            let score = matching::family_similarity(equipment, &family, &self.config);
            if score.similarity < p.min_similarity {
                continue;
            }
            let Some(tier) = ConfidenceTier::from_similarity(score.similarity) else {
                continue;
            };
            matches.push(PatternMatch {
                equipment_id: equipment.equipment_id.clone(),
                pattern_type: PatternType::Family,
                pattern_id: family.family_id.clone(),
                confidence_tier: tier,
                similarity: clamp01(score.similarity),
                matching_attributes: score.matching_attributes,
                deviations: score.deviations,
                recommendations: Vec::new(),
            });
        }

        // 2. 劣化模式匹配
        for pattern in self.registry.patterns() {
            let Some(score) =
                matching::degradation_applicability(equipment, data, &pattern, today)
            else {
                continue;
            };
            if score.similarity < p.min_similarity {
                continue;
            }
            let Some(tier) = ConfidenceTier::from_similarity(score.similarity) else {
                continue;
            };
            matches.push(PatternMatch {
                equipment_id: equipment.equipment_id.clone(),
                pattern_type: PatternType::Degradation,
                pattern_id: pattern.pattern_id.clone(),
                confidence_tier: tier,
                similarity: clamp01(score.similarity),
                matching_attributes: score.matching_attributes,
                deviations: score.deviations,
                recommendations: score.recommendations,
            });
        }

        // 相似度降序, 便于消费方取最优
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        // 3. 异常检测
        let anomalies = anomaly::detect(
            equipment,
            history,
            &matches,
            self.registry.family_count(),
            &self.config,
            today,
        );

        // 4. 调整量
        let risk_adjustment = self.build_adjustment(&matches);

        debug!(
            equipment_id = %equipment.equipment_id,
            matches = matches.len(),
            anomalies = anomalies.len(),
            pof_multiplier = risk_adjustment.pof_multiplier,
            "模式分析完成"
        );

        PatternAnalysisResult {
            equipment_id: equipment.equipment_id.clone(),
            matches,
            anomalies,
            risk_adjustment,
        }
    }

    /// 由匹配结果推导风险/参数调整量
    ///
    /// # 规则
    /// - 劣化匹配相似度 > 阈值 (0.7) => 抬升 PoF, 收紧周期
    /// - 家族匹配高档 (HIGH) => 置信度加成
    fn build_adjustment(&self, matches: &[PatternMatch]) -> RiskAdjustment {
        let p = &self.config.pattern;
        let mut adjustment = RiskAdjustment::default();

        let best_degradation = matches
            .iter()
            .filter(|m| m.pattern_type == PatternType::Degradation)
            .max_by(|a, b| a.similarity.total_cmp(&b.similarity));
        if let Some(m) = best_degradation {
            if m.similarity > p.degradation_pof_threshold {
                adjustment.pof_multiplier = p.degradation_pof_multiplier;
                adjustment.interval_multiplier = p.degradation_interval_multiplier;
                adjustment.reasons.push(format!(
                    "劣化模式 {} 相似度 {:.2} 超过 {:.2}, 抬升 PoF 并收紧周期",
                    m.pattern_id, m.similarity, p.degradation_pof_threshold
                ));
            }
        }

        let best_family = matches
            .iter()
            .filter(|m| m.pattern_type == PatternType::Family)
            .max_by(|a, b| a.similarity.total_cmp(&b.similarity));
        if let Some(m) = best_family {
            if m.confidence_tier == ConfidenceTier::High {
                adjustment.confidence_bonus = p.family_high_confidence_bonus;
                adjustment.reasons.push(format!(
                    "家族 {} 高相似 ({:.2}), 置信度加成 {:.2}",
                    m.pattern_id, m.similarity, p.family_high_confidence_bonus
                ));
            }
        }

        adjustment
    }

    // ==========================================
    // 全量家族推导 (先分组, 后建档/精炼)
    // ==========================================

    /// 对设备总体做一次家族推导
    ///
    /// # 规则
    /// - 先对全量位号做一次聚类分组 (幂等, 与顺序无关)
    /// - 组员数 >= min_family_size 才建档
    /// - 已有同规范ID家族 => 整条精炼替换, 不新建
    pub fn derive_families(&self, population: &[EquipmentData]) -> PopulationAnalysis {
        let ids: Vec<String> = population
            .iter()
            .map(|e| e.equipment_id.clone())
            .collect();
        let by_id: HashMap<&str, &EquipmentData> = population
            .iter()
            .map(|e| (e.equipment_id.as_str(), e))
            .collect();

        let groups = self.grouping.group(&ids);
        let mut new_families = 0usize;
        let mut refined_families = 0usize;

        for group in &groups {
            if group.members.len() < self.config.pattern.min_family_size {
                continue;
            }
            let members: Vec<&EquipmentData> = group
                .members
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).copied())
                .collect();
            if members.is_empty() {
                continue;
            }

            match self.registry.family(&group.canonical_id) {
                Some(existing) => {
                    let refined = refine_family(existing, group, &members);
                    self.registry.upsert_family(refined);
                    refined_families += 1;
                }
                None => {
                    let family = build_family(group, &members);
                    self.registry.upsert_family(family);
                    new_families += 1;
                }
            }
        }

        info!(
            groups = groups.len(),
            new_families, refined_families, "全量家族推导完成"
        );

        PopulationAnalysis {
            groups,
            new_families,
            refined_families,
        }
    }
}

// ==========================================
// 家族建档/精炼 (纯函数)
// ==========================================

/// 由成员推导共性特征
fn characteristics_of(members: &[&EquipmentData]) -> FamilyCharacteristics {
    let pressures: Vec<f64> = members
        .iter()
        .filter_map(|e| e.design_pressure_mpa)
        .collect();
    let temperatures: Vec<f64> = members
        .iter()
        .filter_map(|e| e.design_temperature_c)
        .collect();

    let range = |values: &[f64]| -> Option<(f64, f64)> {
        if values.is_empty() {
            return None;
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    };

    // 全员材质一致才视为家族共同材质
    let mut materials: BTreeSet<&String> = BTreeSet::new();
    for e in members {
        if let Some(m) = &e.material {
            materials.insert(m);
        }
    }
    let common_material = if materials.len() == 1 && members.iter().all(|e| e.material.is_some())
    {
        materials.iter().next().map(|s| (*s).clone())
    } else {
        None
    };

    // 关键度众数
    let mut counts: BTreeMap<CriticalityLevel, usize> = BTreeMap::new();
    for e in members {
        *counts.entry(e.criticality).or_insert(0) += 1;
    }
    let typical_criticality = counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(level, _)| level);

    FamilyCharacteristics {
        design_pressure_range_mpa: range(&pressures),
        design_temperature_range_c: range(&temperatures),
        common_material,
        typical_criticality,
    }
}

/// 成员中最常见的设备类型
fn dominant_type(members: &[&EquipmentData]) -> EquipmentType {
    let mut counts: BTreeMap<EquipmentType, usize> = BTreeMap::new();
    for e in members {
        *counts.entry(e.equipment_type).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(equipment_type, _)| equipment_type)
        .unwrap_or(EquipmentType::Other)
}

fn build_family(group: &TagGroup, members: &[&EquipmentData]) -> EquipmentFamily {
    EquipmentFamily {
        family_id: group.canonical_id.clone(),
        equipment_type: dominant_type(members),
        service_types: members.iter().map(|e| e.service_type.clone()).collect(),
        common_characteristics: characteristics_of(members),
        member_equipment: group.members.clone(),
        degradation_patterns: Vec::new(),
        typical_risk: None,
        recommended_parameters: BTreeMap::new(),
        confidence_score: 0.5,
        observation_count: 1,
        updated_at: Utc::now().naive_utc(),
    }
}

/// 精炼: 成员并集 + 特征重算, 置信度保留由学习回路调节
fn refine_family(
    mut existing: EquipmentFamily,
    group: &TagGroup,
    members: &[&EquipmentData],
) -> EquipmentFamily {
    existing
        .member_equipment
        .extend(group.members.iter().cloned());
    existing
        .service_types
        .extend(members.iter().map(|e| e.service_type.clone()));
    existing.common_characteristics = characteristics_of(members);
    existing.equipment_type = dominant_type(members);
    existing.observation_count = existing.observation_count.saturating_add(1);
    existing.updated_at = Utc::now().naive_utc();
    existing
}
