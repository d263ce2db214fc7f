// ==========================================
// 设备完整性管理系统 - RBI 计算核心库
// ==========================================
// 依据: API RP 580/581 风险基础检验 (Risk-Based Inspection)
// 系统定位: 决策支持核心 (检验周期推荐, 人工最终控制权)
// 技术栈: Rust + tokio (批量计算)
// ==========================================
// 边界: HTTP/持久化/通知/鉴权均为外部协作方,
//       本库只接收内存数据结构并返回计算结果
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 计算参数配置
pub mod config;

// 引擎层 - RBI 计算与模式智能
pub mod engine;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AnomalyKind, CalculationLevel, CoatingCondition, ConfidenceTier, CriticalityLevel,
    EquipmentType, InspectionQuality, PatternType, RiskLevel,
};

// 领域实体
pub use domain::{
    AgeRatePoint, AnomalyFlag, CalculationResult, CofScores, DegradationPattern, EquipmentData,
    EquipmentFamily, ExtractedRBIData, FamilyCharacteristics, PatternAnalysisResult,
    PatternFeedback, PatternMatch, PredictionRecord, RegistrySnapshot, RiskAdjustment,
    ThicknessMeasurement, VerifiedOutcome,
};

// 配置
pub use config::RbiConfig;

// 引擎
pub use engine::{
    AdaptiveLearningEngine, BatchCalculator, BatchItem, BatchOutcome, DataQualityAssessor,
    LearningSummary, PatternEngine, PatternRegistry, RbiCalculator, RbiError,
    TagGroupingAnalyzer,
};
