// ==========================================
// 设备完整性管理系统 - 等级回退计算器核心
// ==========================================
// 计算主流程:
//   校验 -> 缓存查询 -> 等级回退循环 -> 模式调整 ->
//   风险矩阵 -> 质量评估 -> 周期推荐 -> 结果落档
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::{EquipmentData, ExtractedRBIData};
use crate::domain::result::CalculationResult;
use crate::domain::types::{clamp01, CalculationLevel};
use crate::engine::cache::{CalcCache, CalcKey};
use crate::engine::error::RbiError;
use crate::engine::pattern::PatternEngine;
use crate::engine::quality::DataQualityAssessor;
use crate::engine::registry::PatternRegistry;
use chrono::{Months, NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// RbiCalculator - 等级回退计算器
// ==========================================
pub struct RbiCalculator {
    config: Arc<RbiConfig>,
    registry: Arc<PatternRegistry>,
    assessor: DataQualityAssessor,
    pattern_engine: PatternEngine,
    cache: CalcCache,
}

impl RbiCalculator {
    /// 构造函数 (配置在此处校验, 不在使用点校验)
    pub fn new(config: RbiConfig, registry: Arc<PatternRegistry>) -> Result<Self, RbiError> {
        config.validate()?;
        let config = Arc::new(config);
        Ok(Self {
            assessor: DataQualityAssessor::new(config.clone()),
            pattern_engine: PatternEngine::new(config.clone(), registry.clone()),
            cache: CalcCache::new(config.cache.capacity),
            registry,
            config,
        })
    }

    pub fn config(&self) -> &Arc<RbiConfig> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    pub fn pattern_engine(&self) -> &PatternEngine {
        &self.pattern_engine
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 单台 RBI 计算
    ///
    /// # 参数
    /// - `equipment`: 设备主数据 (缺失即致命)
    /// - `data`: 检验提取数据 (可缺, 缺则回退)
    /// - `requested_level`: 请求等级 (None = auto, 从最高等级起算)
    /// - `history`: 该设备历史计算结果 (异常检测用)
    /// - `today`: 计算基准日
    ///
    /// # 错误
    /// - 字段非法 => Validation (不回退)
    /// - 主数据缺失 => EquipmentDataMissing
    /// - 数据不足 => 不报错, 回退并记入 missing_data
    pub fn calculate(
        &self,
        equipment: Option<&EquipmentData>,
        data: Option<&ExtractedRBIData>,
        requested_level: Option<CalculationLevel>,
        history: &[CalculationResult],
        today: NaiveDate,
    ) -> Result<CalculationResult, RbiError> {
        // 1. 主数据缺失是唯一致命缺失 (无等级可算)
        let equipment = equipment.ok_or_else(|| RbiError::EquipmentDataMissing {
            equipment_id: "<unknown>".to_string(),
        })?;
        if equipment.equipment_id.trim().is_empty() {
            return Err(RbiError::EquipmentDataMissing {
                equipment_id: equipment.equipment_id.clone(),
            });
        }

        // 2. 数值校验: 非法字段直接报错, 不进入回退
        super::validate::validate_inputs(equipment, data)?;

        let requested = requested_level.unwrap_or_else(CalculationLevel::highest);

        // 3. 缓存查询 (注册表变更使旧键失配)
        let key = CalcKey::build(equipment, data, requested, self.registry.generation());
        if let Some(hit) = self.cache.get(&key) {
            debug!(equipment_id = %equipment.equipment_id, "计算缓存命中");
            return Ok(hit);
        }

        // 4. 等级回退循环: 从请求等级逐级下探, Level1 保底
        let mut missing_data: Vec<String> = Vec::new();
        let mut level = requested;
        let (achieved, raw_pof, level_notes) = loop {
            let attempt = match level {
                CalculationLevel::Level3 => {
                    super::level3::compute(data, &self.config).map(|o| {
                        (
                            o.pof,
                            vec![format!(
                                "trend {:.3} mm/y, remaining {:.1}y",
                                o.trend_rate_mm_per_year, o.remaining_life_years
                            )],
                        )
                    })
                }
                CalculationLevel::Level2 => super::level2::compute(data, &self.config)
                    .map(|o| (o.pof, o.components)),
                CalculationLevel::Level1 => {
                    let o = super::level1::compute(equipment, &self.config, today);
                    break (CalculationLevel::Level1, o.pof, o.components);
                }
            };

            match attempt {
                Ok((pof, notes)) => break (level, pof, notes),
                Err(RbiError::DataInsufficient {
                    level: failed,
                    missing,
                }) => {
                    debug!(
                        equipment_id = %equipment.equipment_id,
                        level = %failed,
                        missing = ?missing,
                        "数据不足, 回退一级"
                    );
                    missing_data.extend(missing);
                    // Level2/Level3 必有下级, 保底在 Level1 分支 break
                    level = failed.next_lower().unwrap_or(CalculationLevel::Level1);
                }
                Err(other) => return Err(other),
            }
        };
        missing_data.dedup();

        // 5. 失效后果 (三维, 仅依赖主数据, 各等级共用)
        let cof_scores = super::level2::consequence_scores(equipment, &self.config);

        // 6. 模式分析 (只读注册表) 与 PoF 调整
        let analysis = self
            .pattern_engine
            .analyze_equipment(equipment, data, history, today);
        let adjustment = &analysis.risk_adjustment;
        let pof_score = clamp01(raw_pof * adjustment.pof_multiplier);

        // 7. 风险矩阵查表 (确定性)
        let (risk_level, risk_reason) = super::matrix::risk_level(pof_score, cof_scores.max());

        // 8. 数据质量评估
        let assessment = self
            .assessor
            .assess(data, achieved, &missing_data, today);

        // 9. 检验周期: 基础周期 × 质量惩罚 × 模式乘数, 收敛到 [min, max]
        let base_months = self.config.intervals.base_months(risk_level);
        let factor = self
            .assessor
            .interval_penalty_factor(assessment.data_quality_score)
            * adjustment.interval_multiplier;
        let interval_months = ((base_months as f64 * factor).round() as u32)
            .clamp(self.config.intervals.min_months, self.config.intervals.max_months);

        let next_inspection_date = today
            .checked_add_months(Months::new(interval_months))
            .unwrap_or(today);

        // 10. 置信度: 质量分 - 回退惩罚 + 模式加成
        let fallback_depth = requested.as_number().saturating_sub(achieved.as_number());
        let confidence_score = clamp01(
            assessment.data_quality_score
                - fallback_depth as f64 * self.config.quality.fallback_penalty_per_level
                + adjustment.confidence_bonus,
        );

        let estimated_parameters = data
            .map(|d| d.estimated_parameters.clone())
            .unwrap_or_default();

        // 11. 输入快照 (审计)
        let input_snapshot = json!({
            "equipment": equipment,
            "extracted_data": data,
            "requested_level": requested,
            "level_notes": &level_notes,
            "adjustment_reasons": &adjustment.reasons,
            "anomalies": &analysis.anomalies,
        });

        let result = CalculationResult {
            calculation_id: Uuid::new_v4().to_string(),
            equipment_id: equipment.equipment_id.clone(),
            requested_level: requested,
            achieved_level: achieved,
            fallback_occurred: achieved != requested,
            pof_score,
            cof_scores,
            risk_level,
            risk_reason,
            confidence_score,
            data_quality_score: assessment.data_quality_score,
            inspection_interval_months: interval_months,
            next_inspection_date,
            missing_data,
            estimated_parameters,
            input_snapshot,
            calculated_at: Utc::now().naive_utc(),
        };

        info!(
            equipment_id = %equipment.equipment_id,
            requested = %requested,
            achieved = %achieved,
            fallback = result.fallback_occurred,
            risk = %risk_level,
            interval_months,
            "RBI 计算完成"
        );

        self.cache.put(key, result.clone());
        Ok(result)
    }
}
