// ==========================================
// 设备完整性管理系统 - 模式识别引擎
// ==========================================
// 依据: API RP 580 - 劣化机理与设备分组
// 红线: 家族建档前必须先做全量聚类分组,
//       同一物理聚类不得产生两条家族记录
// ==========================================
// 职责: 家族匹配 / 劣化模式匹配 / 异常检测 /
//       风险与参数调整量输出
// 输入: 设备主数据 + 检验数据 + 历史计算结果
// 输出: PatternAnalysisResult (含 RiskAdjustment)
// ==========================================

mod anomaly;
mod core;
mod matching;

#[cfg(test)]
mod tests;

pub use core::{PatternEngine, PopulationAnalysis};
