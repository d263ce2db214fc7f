// ==========================================
// 设备完整性管理系统 - 等级回退计算器
// ==========================================
// 依据: API RP 581 - PoF/CoF 与风险矩阵
// ==========================================
// 等级体系: Level1 (仅主数据, 保底) ->
//           Level2 (加权评分表) ->
//           Level3 (测厚趋势外推)
// 红线: 达成等级恒 <= 请求等级 (只降不升);
//       数据不足走回退, 不作为失败抛出;
//       回退以 fallback_occurred 标志 + 缺失清单上报
// ==========================================
// 职责: 单台 RBI 计算全流程
// 输入: 设备主数据 + 检验数据 + 请求等级 + 历史结果
// 输出: CalculationResult (不可变)
// ==========================================

mod core;
mod level1;
mod level2;
mod level3;
mod matrix;
mod validate;

pub use core::RbiCalculator;
