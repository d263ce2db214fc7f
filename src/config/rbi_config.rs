// ==========================================
// 设备完整性管理系统 - RBI 计算配置
// ==========================================
// 职责: 各计算等级的评分参数与周期表
// 红线: 构造时校验, 不在使用点校验
// ==========================================
// 注意: 数值权重为工程缺省值, 投产前须按
//       API RP 581 对照标定
// ==========================================

use crate::engine::error::RbiError;
use crate::domain::types::RiskLevel;
use serde::{Deserialize, Serialize};

// ==========================================
// IntervalConfig - 检验周期表
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// 低风险基础周期 (月)
    pub base_months_low: u32,
    /// 中风险基础周期 (月)
    pub base_months_medium: u32,
    /// 高风险基础周期 (月)
    pub base_months_high: u32,
    /// 极高风险基础周期 (月)
    pub base_months_very_high: u32,
    /// 周期下限 (月)
    pub min_months: u32,
    /// 周期上限 (月)
    pub max_months: u32,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            base_months_low: 60,
            base_months_medium: 36,
            base_months_high: 12,
            base_months_very_high: 6,
            min_months: 6,
            max_months: 60,
        }
    }
}

impl IntervalConfig {
    /// 风险等级对应的基础周期
    pub fn base_months(&self, risk: RiskLevel) -> u32 {
        match risk {
            RiskLevel::Low => self.base_months_low,
            RiskLevel::Medium => self.base_months_medium,
            RiskLevel::High => self.base_months_high,
            RiskLevel::VeryHigh => self.base_months_very_high,
        }
    }
}

// ==========================================
// Level1Config - 等级1 (仅主数据) 参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level1Config {
    /// PoF 基础分
    pub base_pof: f64,
    /// 年龄分界: 新设备 (年)
    pub young_age_years: f64,
    /// 年龄分界: 中龄 (年)
    pub mid_age_years: f64,
    /// 年龄分界: 老龄 (年)
    pub old_age_years: f64,
    /// 中龄加分
    pub mid_age_score: f64,
    /// 老龄加分
    pub old_age_score: f64,
    /// 超老龄加分
    pub very_old_age_score: f64,
    /// 年龄未知时的保守加分
    pub unknown_age_score: f64,
    /// 腐蚀性介质加分
    pub corrosive_service_bonus: f64,
}

impl Default for Level1Config {
    fn default() -> Self {
        Self {
            base_pof: 0.2,
            young_age_years: 5.0,
            mid_age_years: 15.0,
            old_age_years: 30.0,
            mid_age_score: 0.1,
            old_age_score: 0.25,
            very_old_age_score: 0.4,
            unknown_age_score: 0.2,
            corrosive_service_bonus: 0.15,
        }
    }
}

// ==========================================
// Level2Config - 等级2 (加权评分表) 参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level2Config {
    /// 腐蚀速率权重
    pub corrosion_weight: f64,
    /// 涂层状态权重
    pub coating_weight: f64,
    /// 损伤机理权重
    pub damage_weight: f64,
    /// 腐蚀速率红线阈值 (mm/年), 超过即满分
    pub corrosion_high_threshold: f64,
    /// 腐蚀速率高档阈值 (mm/年)
    pub corrosion_medium_threshold: f64,
    /// 腐蚀速率低档阈值 (mm/年)
    pub corrosion_low_threshold: f64,
    /// 分项缺测时的中性分
    pub neutral_component_score: f64,
    /// 每条损伤机理的贡献分
    pub damage_mechanism_score: f64,
    /// 高压加成分界 (MPa)
    pub high_pressure_mpa: f64,
    /// 高压安全后果加成
    pub high_pressure_bonus: f64,
}

impl Default for Level2Config {
    fn default() -> Self {
        Self {
            corrosion_weight: 0.4,
            coating_weight: 0.3,
            damage_weight: 0.3,
            corrosion_high_threshold: 0.2,
            corrosion_medium_threshold: 0.1,
            corrosion_low_threshold: 0.05,
            neutral_component_score: 0.5,
            damage_mechanism_score: 0.25,
            high_pressure_mpa: 5.0,
            high_pressure_bonus: 0.1,
        }
    }
}

// ==========================================
// Level3Config - 等级3 (趋势外推) 参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level3Config {
    /// 趋势拟合所需最少测点数
    pub min_measurement_points: usize,
    /// 最小允许壁厚 (mm)
    pub min_allowable_thickness_mm: f64,
    /// 剩余寿命归一化视界 (年)
    pub horizon_years: f64,
    /// 视为无减薄的速率下限 (mm/年)
    pub negligible_rate_mm_per_year: f64,
    /// PoF 下限 (趋势平稳时)
    pub pof_floor: f64,
    /// PoF 上限
    pub pof_ceiling: f64,
}

impl Default for Level3Config {
    fn default() -> Self {
        Self {
            min_measurement_points: 3,
            min_allowable_thickness_mm: 2.5,
            horizon_years: 20.0,
            negligible_rate_mm_per_year: 1e-3,
            pof_floor: 0.02,
            pof_ceiling: 0.98,
        }
    }
}

// ==========================================
// QualityConfig - 数据质量与置信度参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// 满分时效窗口 (天)
    pub full_score_days: i64,
    /// 线性衰减终点 (天)
    pub decay_floor_days: i64,
    /// 时效分下限
    pub timeliness_floor: f64,
    /// 每回退一级的置信度扣减
    pub fallback_penalty_per_level: f64,
    /// 质量分 >= 该值时周期不缩短
    pub interval_penalty_good_threshold: f64,
    /// 质量分 >= 该值时周期乘 0.85
    pub interval_penalty_fair_threshold: f64,
    /// 质量分 >= 该值时周期乘 0.7
    pub interval_penalty_poor_threshold: f64,
    /// 一般质量周期乘数
    pub interval_factor_fair: f64,
    /// 较差质量周期乘数
    pub interval_factor_poor: f64,
    /// 极差质量周期乘数
    pub interval_factor_bad: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            full_score_days: 90,
            decay_floor_days: 365,
            timeliness_floor: 0.3,
            fallback_penalty_per_level: 0.15,
            interval_penalty_good_threshold: 0.8,
            interval_penalty_fair_threshold: 0.6,
            interval_penalty_poor_threshold: 0.4,
            interval_factor_fair: 0.85,
            interval_factor_poor: 0.7,
            interval_factor_bad: 0.6,
        }
    }
}

// ==========================================
// PatternConfig - 模式识别参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// 类型/服务精确匹配权重
    pub type_service_weight: f64,
    /// 压力等级相容性权重
    pub pressure_weight: f64,
    /// 关键度相容性权重
    pub criticality_weight: f64,
    /// 匹配保留下限 (低于即丢弃)
    pub min_similarity: f64,
    /// 劣化模式相似度超此值时抬升 PoF
    pub degradation_pof_threshold: f64,
    /// 劣化匹配 PoF 乘数
    pub degradation_pof_multiplier: f64,
    /// 劣化匹配周期乘数 (收紧)
    pub degradation_interval_multiplier: f64,
    /// 家族高相似置信度加成
    pub family_high_confidence_bonus: f64,
    /// 建档所需最少成员数
    pub min_family_size: usize,
    /// 历史风险等级波动阈值 (档位差)
    pub risk_variance_threshold: i32,
    /// 低置信度阈值
    pub low_confidence_threshold: f64,
    /// 低置信度连续窗口 (次)
    pub low_confidence_window: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            type_service_weight: 0.6,
            pressure_weight: 0.2,
            criticality_weight: 0.2,
            min_similarity: 0.4,
            degradation_pof_threshold: 0.7,
            degradation_pof_multiplier: 1.25,
            degradation_interval_multiplier: 0.85,
            family_high_confidence_bonus: 0.1,
            min_family_size: 3,
            risk_variance_threshold: 2,
            low_confidence_threshold: 0.4,
            low_confidence_window: 3,
        }
    }
}

// ==========================================
// LearningConfig - 自适应学习参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// EMA 生效所需最少观测次数 (门控)
    pub ema_min_observations: u32,
    /// 推荐参数向观测值靠拢的比例
    pub parameter_nudge_ratio: f64,
    /// 劣化模式建档所需最少同介质设备数
    pub min_pattern_members: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            ema_min_observations: 3,
            parameter_nudge_ratio: 0.25,
            min_pattern_members: 3,
        }
    }
}

// ==========================================
// BatchConfig - 批量计算参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// 工作池并发上限
    pub max_workers: usize,
    /// 单项计算超时 (秒)
    pub timeout_seconds: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            timeout_seconds: 30,
        }
    }
}

// ==========================================
// CacheConfig - 计算缓存参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 缓存容量 (条)
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

// ==========================================
// RbiConfig - 顶层配置
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RbiConfig {
    #[serde(default)]
    pub intervals: IntervalConfig,
    #[serde(default)]
    pub level1: Level1Config,
    #[serde(default)]
    pub level2: Level2Config,
    #[serde(default)]
    pub level3: Level3Config,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub pattern: PatternConfig,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl RbiConfig {
    /// 构造时校验
    ///
    /// # 规则
    /// - 各权重组之和必须为 1
    /// - 周期表随风险升高单调不增, 且落在 [min, max]
    /// - 所有比例型参数在 [0,1]
    pub fn validate(&self) -> Result<(), RbiError> {
        let ratio = |name: &str, v: f64| -> Result<(), RbiError> {
            if !(0.0..=1.0).contains(&v) || !v.is_finite() {
                return Err(RbiError::Config {
                    message: format!("{} 必须在 [0,1] 区间, 实际 {}", name, v),
                });
            }
            Ok(())
        };

        let l2_sum =
            self.level2.corrosion_weight + self.level2.coating_weight + self.level2.damage_weight;
        if (l2_sum - 1.0).abs() > 1e-6 {
            return Err(RbiError::Config {
                message: format!("等级2评分权重之和必须为 1, 实际 {}", l2_sum),
            });
        }

        let pat_sum = self.pattern.type_service_weight
            + self.pattern.pressure_weight
            + self.pattern.criticality_weight;
        if (pat_sum - 1.0).abs() > 1e-6 {
            return Err(RbiError::Config {
                message: format!("家族相似度权重之和必须为 1, 实际 {}", pat_sum),
            });
        }

        if self.intervals.min_months == 0 || self.intervals.min_months > self.intervals.max_months {
            return Err(RbiError::Config {
                message: format!(
                    "周期上下限非法: min={}, max={}",
                    self.intervals.min_months, self.intervals.max_months
                ),
            });
        }

        // 周期表: 风险越高周期越短 (单调不增)
        let bases = [
            self.intervals.base_months_low,
            self.intervals.base_months_medium,
            self.intervals.base_months_high,
            self.intervals.base_months_very_high,
        ];
        if bases.windows(2).any(|w| w[0] < w[1]) {
            return Err(RbiError::Config {
                message: "周期表必须随风险升高单调不增".to_string(),
            });
        }

        if self.level2.corrosion_high_threshold <= self.level2.corrosion_medium_threshold
            || self.level2.corrosion_medium_threshold <= self.level2.corrosion_low_threshold
            || self.level2.corrosion_low_threshold <= 0.0
        {
            return Err(RbiError::Config {
                message: "腐蚀速率阈值必须严格递增且为正".to_string(),
            });
        }

        if self.level3.min_measurement_points < 2 {
            return Err(RbiError::Config {
                message: "趋势拟合至少需要 2 个测点".to_string(),
            });
        }

        if self.quality.full_score_days <= 0
            || self.quality.decay_floor_days <= self.quality.full_score_days
        {
            return Err(RbiError::Config {
                message: "时效窗口非法: 衰减终点必须大于满分窗口".to_string(),
            });
        }

        ratio("timeliness_floor", self.quality.timeliness_floor)?;
        ratio(
            "fallback_penalty_per_level",
            self.quality.fallback_penalty_per_level,
        )?;
        ratio("min_similarity", self.pattern.min_similarity)?;
        ratio(
            "degradation_pof_threshold",
            self.pattern.degradation_pof_threshold,
        )?;
        ratio(
            "family_high_confidence_bonus",
            self.pattern.family_high_confidence_bonus,
        )?;
        ratio("low_confidence_threshold", self.pattern.low_confidence_threshold)?;
        ratio("parameter_nudge_ratio", self.learning.parameter_nudge_ratio)?;
        ratio("pof_floor", self.level3.pof_floor)?;
        ratio("pof_ceiling", self.level3.pof_ceiling)?;

        if self.pattern.degradation_pof_multiplier < 1.0 {
            return Err(RbiError::Config {
                message: "劣化匹配 PoF 乘数不得小于 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.pattern.degradation_interval_multiplier) {
            return Err(RbiError::Config {
                message: "劣化匹配周期乘数必须在 (0,1]".to_string(),
            });
        }

        if self.batch.max_workers == 0 {
            return Err(RbiError::Config {
                message: "批量计算工作池并发上限必须 >= 1".to_string(),
            });
        }
        if self.batch.timeout_seconds == 0 {
            return Err(RbiError::Config {
                message: "单项计算超时必须 >= 1 秒".to_string(),
            });
        }
        if self.cache.capacity == 0 {
            return Err(RbiError::Config {
                message: "缓存容量必须 >= 1".to_string(),
            });
        }

        Ok(())
    }
}
