// ==========================================
// 设备完整性管理系统 - 领域模型层
// ==========================================
// 主实体: 设备主数据 / 检验数据 / 计算结果 /
//         设备家族 / 劣化模式 / 预测记录
// ==========================================

pub mod equipment;
pub mod family;
pub mod result;
pub mod types;

// 重导出领域实体
pub use equipment::{EquipmentData, ExtractedRBIData, ThicknessMeasurement};
pub use family::{
    AgeRatePoint, AnomalyFlag, DegradationPattern, EquipmentFamily, FamilyCharacteristics,
    PatternAnalysisResult, PatternFeedback, PatternMatch, PredictionRecord, RegistrySnapshot,
    RiskAdjustment, VerifiedOutcome,
};
pub use result::{CalculationResult, CofScores};
