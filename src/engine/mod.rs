// ==========================================
// 设备完整性管理系统 - 引擎层
// ==========================================
// 依据: API RP 580/581 - RBI 计算方法体系
// ==========================================
// 职责: RBI 计算与模式智能的业务规则引擎
// 红线: 引擎内不做阻塞 I/O, 所有输入由调用方
//       预先物化为内存结构; 所有规则必须输出 reason
// ==========================================

pub mod batch;
pub mod cache;
pub mod calculator;
pub mod error;
pub mod learning;
pub mod pattern;
pub mod quality;
pub mod registry;
pub mod tag;

// 重导出核心引擎
pub use batch::{BatchCalculator, BatchFailure, BatchItem, BatchOutcome};
pub use cache::{CalcCache, CalcKey};
pub use calculator::RbiCalculator;
pub use error::RbiError;
pub use learning::{AdaptiveLearningEngine, LearningSummary};
pub use pattern::{PatternEngine, PopulationAnalysis};
pub use quality::{DataQualityAssessment, DataQualityAssessor};
pub use registry::{ImportReport, PatternRegistry};
pub use tag::{EquipmentTag, TagGroup, TagGroupingAnalyzer};
