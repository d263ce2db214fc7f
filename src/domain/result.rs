// ==========================================
// 设备完整性管理系统 - 计算结果领域模型
// ==========================================
// 用途: 单次 RBI 计算的完整输出, 产生后不可变
// 历史由外部存储协作方保留
// 红线: 所有规则必须输出 reason (可解释性)
// ==========================================

use crate::domain::types::{CalculationLevel, RiskLevel};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// CofScores - 多维失效后果分
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CofScores {
    /// 安全后果 [0,1]
    pub safety: f64,
    /// 环境后果 [0,1]
    pub environmental: f64,
    /// 经济后果 [0,1]
    pub economic: f64,
}

impl CofScores {
    /// 三维中的最大值, 风险矩阵的 CoF 输入
    pub fn max(&self) -> f64 {
        self.safety.max(self.environmental).max(self.economic)
    }
}

// ==========================================
// CalculationResult - RBI 计算结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    /// 计算结果ID
    pub calculation_id: String,

    /// 设备位号
    pub equipment_id: String,

    /// 请求计算等级 (auto 已解析为最高等级)
    pub requested_level: CalculationLevel,

    /// 实际达成等级 (恒 <= 请求等级)
    pub achieved_level: CalculationLevel,

    /// 是否发生等级回退
    pub fallback_occurred: bool,

    /// 失效概率分 [0,1]
    pub pof_score: f64,

    /// 失效后果分 (安全/环境/经济)
    pub cof_scores: CofScores,

    /// 风险等级 (PoF×CoF 矩阵查表)
    pub risk_level: RiskLevel,

    /// 风险评定原因 (可解释性)
    pub risk_reason: String,

    /// 综合置信度 [0,1]
    pub confidence_score: f64,

    /// 数据质量分 [0,1]
    pub data_quality_score: f64,

    /// 推荐检验周期 (月)
    pub inspection_interval_months: u32,

    /// 下次检验日期
    pub next_inspection_date: NaiveDate,

    /// 缺失数据项 (触发回退的字段)
    #[serde(default)]
    pub missing_data: Vec<String>,

    /// 估计参数项 (采集侧估计而非实测)
    #[serde(default)]
    pub estimated_parameters: Vec<String>,

    /// 输入参数快照 (审计用)
    pub input_snapshot: serde_json::Value,

    /// 计算时间
    pub calculated_at: NaiveDateTime,
}

impl CalculationResult {
    /// 回退深度 (请求等级与达成等级的差)
    pub fn fallback_depth(&self) -> u8 {
        self.requested_level
            .as_number()
            .saturating_sub(self.achieved_level.as_number())
    }
}
