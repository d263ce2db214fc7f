// ==========================================
// 设备完整性管理系统 - 家族与劣化模式领域模型
// ==========================================
// EquipmentFamily: 位号聚类推导的设备家族 (>=3 台成员时建档)
// DegradationPattern: 介质相关的劣化模式
// 红线: 同一物理聚类只允许一条家族记录 (规范ID推导保证)
// ==========================================
// 序列化: 所有可选字段 serde(default), 允许外部
//         持久化层回传部分快照而不导致导入失败
// ==========================================

use crate::domain::types::{
    AnomalyKind, ConfidenceTier, CriticalityLevel, EquipmentType, PatternType, RiskLevel,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn default_confidence() -> f64 {
    0.5
}

fn default_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

// ==========================================
// FamilyCharacteristics - 家族共性特征
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyCharacteristics {
    /// 设计压力包络 (MPa, [min, max])
    #[serde(default)]
    pub design_pressure_range_mpa: Option<(f64, f64)>,

    /// 设计温度包络 (℃, [min, max])
    #[serde(default)]
    pub design_temperature_range_c: Option<(f64, f64)>,

    /// 共同材质 (全员一致时才有值)
    #[serde(default)]
    pub common_material: Option<String>,

    /// 典型关键度 (成员众数)
    #[serde(default)]
    pub typical_criticality: Option<CriticalityLevel>,
}

// ==========================================
// EquipmentFamily - 设备家族
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentFamily {
    /// 规范家族ID (组内字典序最小的基准位号;
    /// 快照导入时以映射键名为准)
    #[serde(default)]
    pub family_id: String,

    /// 设备类型
    pub equipment_type: EquipmentType,

    /// 成员覆盖的服务类型集合
    #[serde(default)]
    pub service_types: BTreeSet<String>,

    /// 共性特征
    #[serde(default)]
    pub common_characteristics: FamilyCharacteristics,

    /// 成员位号集合 (集合语义, 无重复)
    #[serde(default)]
    pub member_equipment: BTreeSet<String>,

    /// 关联劣化模式名
    #[serde(default)]
    pub degradation_patterns: Vec<String>,

    /// 典型风险轮廓
    #[serde(default)]
    pub typical_risk: Option<RiskLevel>,

    /// 推荐参数 (缺省为空映射)
    #[serde(default)]
    pub recommended_parameters: BTreeMap<String, f64>,

    /// 家族置信度 [0,1]
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,

    /// 学习观测次数 (EMA 门控用)
    #[serde(default)]
    pub observation_count: u32,

    /// 最近一次精炼时间
    #[serde(default = "default_timestamp")]
    pub updated_at: NaiveDateTime,
}

// ==========================================
// AgeRatePoint - 年龄→劣化速率曲线点
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgeRatePoint {
    /// 设备年龄 (年)
    pub age_years: f64,
    /// 劣化速率因子 [0,1]
    pub rate_factor: f64,
}

// ==========================================
// DegradationPattern - 劣化模式
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationPattern {
    /// 模式ID (如 "DP-SOUR-WATER"; 快照导入时以映射键名为准)
    #[serde(default)]
    pub pattern_id: String,

    /// 适用服务类型
    pub service_type: String,

    /// 适用设备类型集合
    #[serde(default)]
    pub equipment_types: BTreeSet<EquipmentType>,

    /// 劣化特征描述
    #[serde(default)]
    pub characteristics: Vec<String>,

    /// 风险因子 (因子名 -> 权重)
    #[serde(default)]
    pub risk_factors: BTreeMap<String, f64>,

    /// 年龄→劣化速率时间线 (按年龄升序)
    #[serde(default)]
    pub age_rate_curve: Vec<AgeRatePoint>,

    /// 环境因子
    #[serde(default)]
    pub environmental_factors: Vec<String>,

    /// 缓解策略
    #[serde(default)]
    pub mitigation_strategies: Vec<String>,

    /// 对应损伤机理名 (与检验发现比对)
    #[serde(default)]
    pub damage_mechanism: String,

    /// 模式置信度 [0,1]
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,

    /// 支撑证据 (设备位号等)
    #[serde(default)]
    pub evidence: Vec<String>,

    /// 学习观测次数 (EMA 门控用)
    #[serde(default)]
    pub observation_count: u32,

    /// 最近一次精炼时间
    #[serde(default = "default_timestamp")]
    pub updated_at: NaiveDateTime,
}

impl DegradationPattern {
    /// 在年龄→速率曲线上线性插值
    ///
    /// # 规则
    /// - 曲线为空 => 中性因子 0.5
    /// - 低于首点/高于末点 => 取端点值
    pub fn rate_factor_at_age(&self, age_years: f64) -> f64 {
        if self.age_rate_curve.is_empty() {
            return 0.5;
        }
        let mut points = self.age_rate_curve.clone();
        points.sort_by(|a, b| a.age_years.total_cmp(&b.age_years));

        if age_years <= points[0].age_years {
            return points[0].rate_factor;
        }
        if let Some(last) = points.last() {
            if age_years >= last.age_years {
                return last.rate_factor;
            }
        }
        for pair in points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if age_years >= lo.age_years && age_years <= hi.age_years {
                let span = hi.age_years - lo.age_years;
                if span <= f64::EPSILON {
                    return hi.rate_factor;
                }
                let t = (age_years - lo.age_years) / span;
                return lo.rate_factor + t * (hi.rate_factor - lo.rate_factor);
            }
        }
        0.5
    }
}

// ==========================================
// PatternMatch - 模式匹配结果 (瞬态)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    /// 设备位号
    pub equipment_id: String,

    /// 匹配类型 (家族/劣化/工况)
    pub pattern_type: PatternType,

    /// 匹配到的模式/家族ID
    pub pattern_id: String,

    /// 置信档位
    pub confidence_tier: ConfidenceTier,

    /// 相似度 [0,1]
    pub similarity: f64,

    /// 匹配属性
    #[serde(default)]
    pub matching_attributes: Vec<String>,

    /// 偏差项
    #[serde(default)]
    pub deviations: Vec<String>,

    /// 建议措施
    #[serde(default)]
    pub recommendations: Vec<String>,
}

// ==========================================
// AnomalyFlag - 异常标记
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyFlag {
    pub kind: AnomalyKind,
    /// 异常说明 (可解释性)
    pub detail: String,
}

// ==========================================
// RiskAdjustment - 风险/参数调整
// ==========================================
// 模式引擎输出, 等级回退计算器消费
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAdjustment {
    /// PoF 乘数 (匹配强劣化模式时 > 1)
    pub pof_multiplier: f64,

    /// 检验周期乘数 (强劣化匹配时 < 1, 收紧周期)
    pub interval_multiplier: f64,

    /// 置信度加成 (家族高相似时 > 0)
    pub confidence_bonus: f64,

    /// 调整原因
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl Default for RiskAdjustment {
    fn default() -> Self {
        Self {
            pof_multiplier: 1.0,
            interval_multiplier: 1.0,
            confidence_bonus: 0.0,
            reasons: Vec::new(),
        }
    }
}

// ==========================================
// PatternAnalysisResult - 模式分析输出
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternAnalysisResult {
    pub equipment_id: String,

    /// 全部保留匹配 (相似度 >= 0.4)
    #[serde(default)]
    pub matches: Vec<PatternMatch>,

    /// 异常标记
    #[serde(default)]
    pub anomalies: Vec<AnomalyFlag>,

    /// 对计算器的调整量
    pub risk_adjustment: RiskAdjustment,
}

// ==========================================
// PredictionRecord - 预测记录 (学习回路边界对象)
// ==========================================
// 由外部 Prediction Tracker 拥有, 本库只读引用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub equipment_id: String,

    /// 当时匹配的模式ID
    #[serde(default)]
    pub pattern_id: Option<String>,

    /// 预测风险等级
    pub predicted_risk: RiskLevel,

    /// 预测检验周期 (月)
    pub predicted_interval_months: u32,

    /// 预测日期
    pub predicted_at: NaiveDate,

    /// 验证结果 (结局已知后由 Tracker 附加)
    #[serde(default)]
    pub verified_outcome: Option<VerifiedOutcome>,
}

/// 已验证的预测结局
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedOutcome {
    /// 实际观察到的风险等级
    pub observed_risk: RiskLevel,

    /// 预测准确度 [0,1]
    pub accuracy: f64,

    /// 验证日期
    pub verified_at: NaiveDate,
}

// ==========================================
// PatternFeedback - 验证结局反馈元组
// ==========================================
// 由 Prediction Tracker 在结局已知后推送
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternFeedback {
    pub equipment_id: String,

    /// 被验证的家族/模式ID
    pub pattern_id: String,

    /// 观测准确度 [0,1]
    pub observed_accuracy: f64,
}

// ==========================================
// RegistrySnapshot - 注册表快照
// ==========================================
// export/import 的序列化形态 (按ID嵌套映射)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub families: BTreeMap<String, EquipmentFamily>,

    #[serde(default)]
    pub patterns: BTreeMap<String, DegradationPattern>,
}
