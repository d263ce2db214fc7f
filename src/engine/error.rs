// ==========================================
// 设备完整性管理系统 - RBI 核心错误类型
// ==========================================
// 依据: Rust 错误处理最佳实践
// 工具: thiserror 派生宏
// ==========================================
// 传播约定:
// - 结构性/校验失败 => 直接抛给调用方
// - 数据不足 => 引擎内部消化为等级回退, 只记录不抛出
// - 批量路径 => 逐项失败, 不中断同批其余项
// ==========================================

use crate::domain::types::CalculationLevel;
use thiserror::Error;

/// RBI 核心错误类型
#[derive(Error, Debug)]
pub enum RbiError {
    // ===== 输入校验错误 =====
    #[error("输入字段非法 (字段 {field}): {message}")]
    Validation { field: String, message: String },

    // ===== 主数据缺失 (致命, 无等级可算) =====
    #[error("设备主数据缺失: {equipment_id}")]
    EquipmentDataMissing { equipment_id: String },

    // ===== 数据不足 (可恢复, 触发回退, 不对外抛出) =====
    #[error("数据不足以支撑 {level} 计算: 缺失 {missing:?}")]
    DataInsufficient {
        level: CalculationLevel,
        missing: Vec<String>,
    },

    // ===== 快照导入错误 (单条跳过, 导入继续) =====
    #[error("模式/家族快照条目非法 (ID {pattern_id}): {reason}")]
    PatternImport { pattern_id: String, reason: String },

    // ===== 批量计算超时 (逐项上报) =====
    #[error("计算超时 (设备 {equipment_id}): 超过 {seconds} 秒")]
    CalculationTimeout { equipment_id: String, seconds: u64 },

    // ===== 配置校验错误 (构造时) =====
    #[error("配置非法: {message}")]
    Config { message: String },

    // ===== 其他 =====
    #[error("内部错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl RbiError {
    /// 是否属于引擎内部可消化的回退信号
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RbiError::DataInsufficient { .. })
    }
}
