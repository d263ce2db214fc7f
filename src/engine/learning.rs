// ==========================================
// 设备完整性管理系统 - 自适应学习回路
// ==========================================
// 职责: 由验证结局反馈与历史数据精炼
//       家族/模式的置信度与推荐参数
// 红线: 注册表变更串行执行, 整条记录替换;
//       批量再发现必须复用与模式引擎相同的
//       规范聚类规则, 不得重复建档
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::EquipmentData;
use crate::domain::family::PatternFeedback;
use crate::domain::result::CalculationResult;
use crate::domain::types::{clamp01, EquipmentType, RiskLevel};
use crate::engine::pattern::PatternEngine;
use crate::engine::registry::PatternRegistry;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// LearningSummary - 学习摘要 (运行看板用)
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningSummary {
    /// 新发现家族数
    pub new_families: usize,
    /// 精炼家族数
    pub refined_families: usize,
    /// 新发现劣化模式数
    pub new_patterns: usize,
    /// 精炼劣化模式数
    pub refined_patterns: usize,
    /// 已应用反馈条数
    pub feedback_applied: usize,
    /// 被跳过的条目 (ID + 原因)
    pub skipped: Vec<String>,
}

// ==========================================
// AdaptiveLearningEngine - 自适应学习引擎
// ==========================================
pub struct AdaptiveLearningEngine {
    config: Arc<RbiConfig>,
    registry: Arc<PatternRegistry>,
    pattern_engine: PatternEngine,
}

impl AdaptiveLearningEngine {
    pub fn new(config: Arc<RbiConfig>, registry: Arc<PatternRegistry>) -> Self {
        Self {
            pattern_engine: PatternEngine::new(config.clone(), registry.clone()),
            config,
            registry,
        }
    }

    // ==========================================
    // 验证结局反馈
    // ==========================================

    /// 应用预测验证反馈 (门控 EMA)
    ///
    /// # 规则
    /// - 每条反馈使观测计数 +1
    /// - 观测计数达到门限 (默认 3) 后才应用
    ///   EMA: new = (old + observed) / 2
    /// - 未知 pattern_id 记入 skipped, 不报错
    pub fn apply_feedback(&self, feedback: &[PatternFeedback]) -> LearningSummary {
        let mut summary = LearningSummary::default();
        let gate = self.config.learning.ema_min_observations;

        for item in feedback {
            let observed = clamp01(item.observed_accuracy);

            if let Some(mut family) = self.registry.family(&item.pattern_id) {
                family.observation_count = family.observation_count.saturating_add(1);
                if family.observation_count >= gate {
                    family.confidence_score = clamp01((family.confidence_score + observed) / 2.0);
                }
                family.updated_at = Utc::now().naive_utc();
                self.registry.upsert_family(family);
                summary.feedback_applied += 1;
                continue;
            }

            if let Some(mut pattern) = self.registry.pattern(&item.pattern_id) {
                pattern.observation_count = pattern.observation_count.saturating_add(1);
                if pattern.observation_count >= gate {
                    pattern.confidence_score =
                        clamp01((pattern.confidence_score + observed) / 2.0);
                }
                if !pattern.evidence.contains(&item.equipment_id) {
                    pattern.evidence.push(item.equipment_id.clone());
                }
                pattern.updated_at = Utc::now().naive_utc();
                self.registry.upsert_pattern(pattern);
                summary.feedback_applied += 1;
                continue;
            }

            warn!(
                pattern_id = %item.pattern_id,
                equipment_id = %item.equipment_id,
                "反馈指向未知家族/模式, 已跳过"
            );
            summary
                .skipped
                .push(format!("{}: 未知家族/模式", item.pattern_id));
        }

        info!(
            applied = summary.feedback_applied,
            skipped = summary.skipped.len(),
            "验证反馈处理完成"
        );
        summary
    }

    /// 从 Prediction Tracker 的预测记录提取反馈元组
    ///
    /// 只取已验证且关联了模式的记录, 原记录只读
    pub fn feedback_from_predictions(
        records: &[crate::domain::family::PredictionRecord],
    ) -> Vec<PatternFeedback> {
        records
            .iter()
            .filter_map(|record| {
                let outcome = record.verified_outcome.as_ref()?;
                let pattern_id = record.pattern_id.clone()?;
                Some(PatternFeedback {
                    equipment_id: record.equipment_id.clone(),
                    pattern_id,
                    observed_accuracy: clamp01(outcome.accuracy),
                })
            })
            .collect()
    }

    // ==========================================
    // 批量再学习
    // ==========================================

    /// 从全量设备与历史结果一次性再推导家族与模式
    ///
    /// # 规则
    /// - 家族: 复用模式引擎的规范聚类 (幂等, 无重复建档)
    /// - 推荐参数: 向成员历史观测值按比例靠拢
    /// - 劣化模式: 按服务类型聚合, 年龄→PoF 分桶成曲线
    pub fn learn_from_corpus(
        &self,
        population: &[EquipmentData],
        history: &[CalculationResult],
    ) -> LearningSummary {
        let mut summary = LearningSummary::default();

        // 1. 家族再推导 (与 §家族建档 同一条聚类规则)
        let analysis = self.pattern_engine.derive_families(population);
        summary.new_families = analysis.new_families;
        summary.refined_families = analysis.refined_families;

        // 2. 家族推荐参数向观测值靠拢
        let by_equipment: HashMap<&str, Vec<&CalculationResult>> = {
            let mut map: HashMap<&str, Vec<&CalculationResult>> = HashMap::new();
            for r in history {
                map.entry(r.equipment_id.as_str()).or_default().push(r);
            }
            map
        };
        self.nudge_family_parameters(&by_equipment);

        // 3. 劣化模式再推导 (按服务类型聚合)
        let (new_patterns, refined_patterns) =
            self.derive_service_patterns(population, &by_equipment);
        summary.new_patterns = new_patterns;
        summary.refined_patterns = refined_patterns;

        info!(
            new_families = summary.new_families,
            refined_families = summary.refined_families,
            new_patterns = summary.new_patterns,
            refined_patterns = summary.refined_patterns,
            "批量再学习完成"
        );
        summary
    }

    /// 推荐参数趋近观测: new = old + ratio * (observed - old)
    fn nudge_family_parameters(&self, by_equipment: &HashMap<&str, Vec<&CalculationResult>>) {
        let ratio = self.config.learning.parameter_nudge_ratio;

        for mut family in self.registry.families() {
            let member_results: Vec<&&CalculationResult> = family
                .member_equipment
                .iter()
                .filter_map(|id| by_equipment.get(id.as_str()))
                .flatten()
                .collect();
            if member_results.is_empty() {
                continue;
            }

            let observed_interval = member_results
                .iter()
                .map(|r| r.inspection_interval_months as f64)
                .sum::<f64>()
                / member_results.len() as f64;

            let entry = family
                .recommended_parameters
                .entry("inspection_interval_months".to_string())
                .or_insert(observed_interval);
            *entry += ratio * (observed_interval - *entry);

            family.typical_risk = dominant_risk(&member_results);
            family.updated_at = Utc::now().naive_utc();

            debug!(
                family_id = %family.family_id,
                observed_interval,
                "家族推荐参数已趋近观测值"
            );
            self.registry.upsert_family(family);
        }
    }

    /// 按服务类型聚合历史, 建档/精炼劣化模式
    fn derive_service_patterns(
        &self,
        population: &[EquipmentData],
        by_equipment: &HashMap<&str, Vec<&CalculationResult>>,
    ) -> (usize, usize) {
        use crate::domain::family::{AgeRatePoint, DegradationPattern};

        let mut by_service: BTreeMap<String, Vec<&EquipmentData>> = BTreeMap::new();
        for e in population {
            by_service
                .entry(e.service_type.to_ascii_lowercase())
                .or_default()
                .push(e);
        }

        let mut new_patterns = 0usize;
        let mut refined_patterns = 0usize;
        let today = Utc::now().date_naive();

        for (service, members) in by_service {
            if members.len() < self.config.learning.min_pattern_members {
                continue;
            }

            // 年龄→PoF 分桶 (0-10 / 10-20 / 20-30 / 30+)
            let mut buckets: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
            for e in &members {
                let Some(age) = e.resolved_age_years(today) else {
                    continue;
                };
                let Some(results) = by_equipment.get(e.equipment_id.as_str()) else {
                    continue;
                };
                let bucket = (age / 10.0).floor().min(3.0) as u32;
                for r in results {
                    buckets.entry(bucket).or_default().push(r.pof_score);
                }
            }
            if buckets.is_empty() {
                continue;
            }

            let curve: Vec<AgeRatePoint> = buckets
                .iter()
                .map(|(bucket, scores)| AgeRatePoint {
                    age_years: (*bucket as f64) * 10.0 + 5.0,
                    rate_factor: clamp01(scores.iter().sum::<f64>() / scores.len() as f64),
                })
                .collect();

            let equipment_types: BTreeSet<EquipmentType> =
                members.iter().map(|e| e.equipment_type).collect();
            let evidence: Vec<String> = members
                .iter()
                .map(|e| e.equipment_id.clone())
                .collect();

            let pattern_id = service_pattern_id(&service);
            match self.registry.pattern(&pattern_id) {
                Some(mut existing) => {
                    existing.age_rate_curve = curve;
                    existing.equipment_types.extend(equipment_types);
                    for id in evidence {
                        if !existing.evidence.contains(&id) {
                            existing.evidence.push(id);
                        }
                    }
                    existing.observation_count = existing.observation_count.saturating_add(1);
                    existing.updated_at = Utc::now().naive_utc();
                    self.registry.upsert_pattern(existing);
                    refined_patterns += 1;
                }
                None => {
                    let pattern = DegradationPattern {
                        pattern_id: pattern_id.clone(),
                        service_type: service.clone(),
                        equipment_types,
                        characteristics: Vec::new(),
                        risk_factors: BTreeMap::new(),
                        age_rate_curve: curve,
                        environmental_factors: Vec::new(),
                        mitigation_strategies: Vec::new(),
                        damage_mechanism: String::new(),
                        confidence_score: 0.5,
                        evidence,
                        observation_count: 1,
                        updated_at: Utc::now().naive_utc(),
                    };
                    self.registry.upsert_pattern(pattern);
                    new_patterns += 1;
                }
            }

            // 家族 ↔ 模式关联
            self.link_pattern_to_families(&service, &pattern_id);
        }

        (new_patterns, refined_patterns)
    }

    /// 把服务模式挂到覆盖该服务的家族上
    fn link_pattern_to_families(&self, service: &str, pattern_id: &str) {
        for mut family in self.registry.families() {
            let covers = family
                .service_types
                .iter()
                .any(|s| s.eq_ignore_ascii_case(service));
            if covers && !family.degradation_patterns.iter().any(|p| p == pattern_id) {
                family.degradation_patterns.push(pattern_id.to_string());
                self.registry.upsert_family(family);
            }
        }
    }
}

/// 成员历史中占比最高的风险等级
fn dominant_risk(results: &[&&CalculationResult]) -> Option<RiskLevel> {
    let mut counts: BTreeMap<RiskLevel, usize> = BTreeMap::new();
    for r in results {
        *counts.entry(r.risk_level).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(level, _)| level)
}

/// 服务类型 -> 模式ID (如 "sour water" -> "DP-SOUR-WATER")
fn service_pattern_id(service: &str) -> String {
    let slug: String = service
        .trim()
        .to_ascii_uppercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("DP-{}", slug)
}
