// ==========================================
// 设备完整性管理系统 - 领域类型定义
// ==========================================
// 依据: API RP 581 - 风险矩阵与等级体系
// 红线: 风险等级是等级制, 不是连续评分制
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 由 PoF×CoF 风险矩阵确定, 四级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,      // 低风险
    Medium,   // 中风险
    High,     // 高风险
    VeryHigh, // 极高风险
}

impl RiskLevel {
    /// 等级序数 (用于历史波动分析)
    pub fn rank(&self) -> i32 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
            RiskLevel::VeryHigh => 3,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::VeryHigh => write!(f, "VERY_HIGH"),
        }
    }
}

// ==========================================
// 计算等级 (Calculation Level)
// ==========================================
// Level1: 仅主数据, 保底等级, 永远可算
// Level2: 需要至少一项检验发现 (加权评分表)
// Level3: 需要测厚时间序列 (趋势外推)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationLevel {
    Level1,
    Level2,
    Level3,
}

impl CalculationLevel {
    /// 最精细等级 (auto 请求的起算点)
    pub fn highest() -> Self {
        CalculationLevel::Level3
    }

    /// 等级序数 (1..=3)
    pub fn as_number(&self) -> u8 {
        match self {
            CalculationLevel::Level1 => 1,
            CalculationLevel::Level2 => 2,
            CalculationLevel::Level3 => 3,
        }
    }

    /// 下一个更粗的等级 (Level1 为保底, 无下级)
    pub fn next_lower(&self) -> Option<Self> {
        match self {
            CalculationLevel::Level3 => Some(CalculationLevel::Level2),
            CalculationLevel::Level2 => Some(CalculationLevel::Level1),
            CalculationLevel::Level1 => None,
        }
    }
}

impl fmt::Display for CalculationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationLevel::Level1 => write!(f, "LEVEL_1"),
            CalculationLevel::Level2 => write!(f, "LEVEL_2"),
            CalculationLevel::Level3 => write!(f, "LEVEL_3"),
        }
    }
}

// ==========================================
// 置信档位 (Confidence Tier)
// ==========================================
// 模式匹配相似度的离散档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    Low,    // 0.4 <= sim < 0.6
    Medium, // 0.6 <= sim < 0.8
    High,   // sim >= 0.8
}

impl ConfidenceTier {
    /// 从相似度映射档位; 低于 0.4 的匹配直接丢弃
    pub fn from_similarity(similarity: f64) -> Option<Self> {
        if similarity >= 0.8 {
            Some(ConfidenceTier::High)
        } else if similarity >= 0.6 {
            Some(ConfidenceTier::Medium)
        } else if similarity >= 0.4 {
            Some(ConfidenceTier::Low)
        } else {
            None
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::Low => write!(f, "LOW"),
            ConfidenceTier::Medium => write!(f, "MEDIUM"),
            ConfidenceTier::High => write!(f, "HIGH"),
        }
    }
}

// ==========================================
// 关键度等级 (Criticality Level)
// ==========================================
// 来源于设备主数据, CoF 安全维度主因子
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriticalityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl CriticalityLevel {
    /// 安全后果基础分
    pub fn safety_score(&self) -> f64 {
        match self {
            CriticalityLevel::Low => 0.2,
            CriticalityLevel::Medium => 0.45,
            CriticalityLevel::High => 0.7,
            CriticalityLevel::Critical => 0.9,
        }
    }

    pub fn rank(&self) -> i32 {
        match self {
            CriticalityLevel::Low => 0,
            CriticalityLevel::Medium => 1,
            CriticalityLevel::High => 2,
            CriticalityLevel::Critical => 3,
        }
    }
}

impl fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticalityLevel::Low => write!(f, "LOW"),
            CriticalityLevel::Medium => write!(f, "MEDIUM"),
            CriticalityLevel::High => write!(f, "HIGH"),
            CriticalityLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 设备类型 (Equipment Type)
// ==========================================
// 与位号类型码对应 (如 101-E-401A 中的 "E")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentType {
    Vessel,     // V - 压力容器
    Exchanger,  // E - 换热器
    Pump,       // P - 泵
    Tank,       // T - 储罐
    Column,     // C - 塔器
    Compressor, // K - 压缩机
    Piping,     // L - 管线
    Other,      // 未识别类型码
}

impl EquipmentType {
    /// 从位号类型码解析
    pub fn from_type_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "V" => EquipmentType::Vessel,
            "E" => EquipmentType::Exchanger,
            "P" => EquipmentType::Pump,
            "T" => EquipmentType::Tank,
            "C" => EquipmentType::Column,
            "K" => EquipmentType::Compressor,
            "L" => EquipmentType::Piping,
            _ => EquipmentType::Other,
        }
    }

    /// 典型服役寿命 (年), 用于异常检测的服役包络
    pub fn typical_service_life_years(&self) -> f64 {
        match self {
            EquipmentType::Vessel => 40.0,
            EquipmentType::Exchanger => 30.0,
            EquipmentType::Pump => 25.0,
            EquipmentType::Tank => 45.0,
            EquipmentType::Column => 40.0,
            EquipmentType::Compressor => 25.0,
            EquipmentType::Piping => 35.0,
            EquipmentType::Other => 30.0,
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquipmentType::Vessel => write!(f, "VESSEL"),
            EquipmentType::Exchanger => write!(f, "EXCHANGER"),
            EquipmentType::Pump => write!(f, "PUMP"),
            EquipmentType::Tank => write!(f, "TANK"),
            EquipmentType::Column => write!(f, "COLUMN"),
            EquipmentType::Compressor => write!(f, "COMPRESSOR"),
            EquipmentType::Piping => write!(f, "PIPING"),
            EquipmentType::Other => write!(f, "OTHER"),
        }
    }
}

// ==========================================
// 涂层状态 (Coating Condition)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoatingCondition {
    Good,   // 完好
    Fair,   // 轻微劣化
    Poor,   // 明显劣化
    Failed, // 失效
}

impl CoatingCondition {
    /// 涂层劣化对 PoF 的贡献分
    pub fn degradation_score(&self) -> f64 {
        match self {
            CoatingCondition::Good => 0.1,
            CoatingCondition::Fair => 0.4,
            CoatingCondition::Poor => 0.7,
            CoatingCondition::Failed => 0.9,
        }
    }
}

impl fmt::Display for CoatingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoatingCondition::Good => write!(f, "GOOD"),
            CoatingCondition::Fair => write!(f, "FAIR"),
            CoatingCondition::Poor => write!(f, "POOR"),
            CoatingCondition::Failed => write!(f, "FAILED"),
        }
    }
}

// ==========================================
// 检验质量评级 (Inspection Quality)
// ==========================================
// 上一轮检验的有效性评级, 影响数据准确度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InspectionQuality {
    Poor,
    Average,
    Good,
    Excellent,
}

impl InspectionQuality {
    /// 检验有效性因子 [0,1]
    pub fn effectiveness(&self) -> f64 {
        match self {
            InspectionQuality::Poor => 0.4,
            InspectionQuality::Average => 0.6,
            InspectionQuality::Good => 0.8,
            InspectionQuality::Excellent => 1.0,
        }
    }
}

impl fmt::Display for InspectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionQuality::Poor => write!(f, "POOR"),
            InspectionQuality::Average => write!(f, "AVERAGE"),
            InspectionQuality::Good => write!(f, "GOOD"),
            InspectionQuality::Excellent => write!(f, "EXCELLENT"),
        }
    }
}

// ==========================================
// 模式类型 (Pattern Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternType {
    Family,      // 设备家族匹配
    Degradation, // 劣化模式匹配
    Operational, // 运行工况匹配
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternType::Family => write!(f, "FAMILY"),
            PatternType::Degradation => write!(f, "DEGRADATION"),
            PatternType::Operational => write!(f, "OPERATIONAL"),
        }
    }
}

// ==========================================
// 异常类别 (Anomaly Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    RiskVariance,            // 自身历史风险等级波动过大
    PersistentLowConfidence, // 置信度持续偏低
    NoFamilyFit,             // 与所有已知家族都不匹配
    AgeOutsideEnvelope,      // 设备年龄超出典型服役包络
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyKind::RiskVariance => write!(f, "RISK_VARIANCE"),
            AnomalyKind::PersistentLowConfidence => write!(f, "PERSISTENT_LOW_CONFIDENCE"),
            AnomalyKind::NoFamilyFit => write!(f, "NO_FAMILY_FIT"),
            AnomalyKind::AgeOutsideEnvelope => write!(f, "AGE_OUTSIDE_ENVELOPE"),
        }
    }
}

/// 数值收敛到 [0,1] 区间
///
/// 所有评分型输出 (置信度/数据质量/相似度) 的统一收口
pub fn clamp01(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
