// ==========================================
// 设备完整性管理系统 - 数据质量评估器
// ==========================================
// 职责: 输入数据的完整性/准确性/时效性打分
// 输出: data_quality_score = 三项均值, 恒在 [0,1]
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::ExtractedRBIData;
use crate::domain::types::{clamp01, CalculationLevel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// DataQualityAssessment - 质量评估输出
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DataQualityAssessment {
    /// 完整性: 1 - 缺失字段数/该等级必需字段数
    pub completeness: f64,
    /// 准确性: 1 - 估计参数数/参数总数
    pub accuracy: f64,
    /// 时效性: 距上次检验天数的衰减函数
    pub timeliness: f64,
    /// 三项均值
    pub data_quality_score: f64,
}

// ==========================================
// DataQualityAssessor - 数据质量评估器
// ==========================================
pub struct DataQualityAssessor {
    config: Arc<RbiConfig>,
}

impl DataQualityAssessor {
    pub fn new(config: Arc<RbiConfig>) -> Self {
        Self { config }
    }

    /// 达成等级对应的必需字段总数
    ///
    /// # 规则
    /// - Level1: 设备类型 / 服务类型 / 年龄
    /// - Level2: 在 Level1 基础上加 检验发现组 + 上次检验日期
    /// - Level3: 在 Level2 基础上加 测厚序列
    pub fn required_field_count(level: CalculationLevel) -> usize {
        match level {
            CalculationLevel::Level1 => 3,
            CalculationLevel::Level2 => 7,
            CalculationLevel::Level3 => 8,
        }
    }

    /// 综合质量评估
    ///
    /// # 参数
    /// - data: 检验数据 (可缺)
    /// - achieved_level: 实际达成等级
    /// - missing: 本次计算记录的缺失字段
    /// - today: 当前日期
    pub fn assess(
        &self,
        data: Option<&ExtractedRBIData>,
        achieved_level: CalculationLevel,
        missing: &[String],
        today: NaiveDate,
    ) -> DataQualityAssessment {
        let required = Self::required_field_count(achieved_level) as f64;
        let completeness = clamp01(1.0 - (missing.len() as f64 / required));

        let accuracy = match data {
            Some(d) => {
                let estimated = d.estimated_parameters.len() as f64;
                clamp01(1.0 - estimated / required)
            }
            // 无检验数据时不加估计惩罚, 缺失已计入完整性
            None => 1.0,
        };

        let timeliness = self.timeliness_score(
            data.and_then(|d| d.last_inspection_date),
            today,
        );

        // 上轮检验有效性折减准确性
        let accuracy = match data.and_then(|d| d.inspection_quality) {
            Some(q) => clamp01(accuracy * (0.5 + 0.5 * q.effectiveness())),
            None => accuracy,
        };

        let data_quality_score = clamp01((completeness + accuracy + timeliness) / 3.0);

        DataQualityAssessment {
            completeness,
            accuracy,
            timeliness,
            data_quality_score,
        }
    }

    /// 时效性衰减函数
    ///
    /// # 规则
    /// - <= full_score_days (90天): 1.0
    /// - 线性衰减至 decay_floor_days (365天)
    /// - 之后保持下限 (0.3); 从未检验按下限计
    pub fn timeliness_score(&self, last_inspection: Option<NaiveDate>, today: NaiveDate) -> f64 {
        let q = &self.config.quality;
        let Some(last) = last_inspection else {
            return q.timeliness_floor;
        };

        let days = (today - last).num_days();
        if days <= q.full_score_days {
            return 1.0;
        }
        if days >= q.decay_floor_days {
            return q.timeliness_floor;
        }

        let span = (q.decay_floor_days - q.full_score_days) as f64;
        let progress = (days - q.full_score_days) as f64 / span;
        clamp01(1.0 - progress * (1.0 - q.timeliness_floor))
    }

    /// 质量分对检验周期的惩罚乘数 (质量越低周期越短)
    pub fn interval_penalty_factor(&self, data_quality_score: f64) -> f64 {
        let q = &self.config.quality;
        if data_quality_score >= q.interval_penalty_good_threshold {
            1.0
        } else if data_quality_score >= q.interval_penalty_fair_threshold {
            q.interval_factor_fair
        } else if data_quality_score >= q.interval_penalty_poor_threshold {
            q.interval_factor_poor
        } else {
            q.interval_factor_bad
        }
    }
}
