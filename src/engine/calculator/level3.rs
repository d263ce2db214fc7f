// ==========================================
// 设备完整性管理系统 - 等级3 计算 (趋势外推)
// ==========================================
// 准入: 足量测厚时间序列 (默认 >= 3 点, 跨度 > 0)
// 方法: 最小二乘拟合减薄趋势 -> 剩余寿命 -> 连续 PoF
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::ExtractedRBIData;
use crate::domain::types::CalculationLevel;
use crate::engine::error::RbiError;

/// 等级3 计算输出
pub(super) struct Level3Outcome {
    pub pof: f64,
    /// 拟合减薄速率 (mm/年, >= 0)
    pub trend_rate_mm_per_year: f64,
    /// 剩余寿命 (年)
    pub remaining_life_years: f64,
}

/// 等级3 PoF 计算
///
/// # 规则
/// - 对 (测量日, 壁厚) 做线性最小二乘
/// - 减薄速率 = -斜率 (增厚/平稳按无减薄处理)
/// - 剩余寿命 = (当前壁厚 - 最小允许壁厚) / 速率
/// - PoF = 1 - 剩余寿命/视界, 收敛到 [floor, ceiling]
pub(super) fn compute(
    data: Option<&ExtractedRBIData>,
    config: &RbiConfig,
) -> Result<Level3Outcome, RbiError> {
    let l3 = &config.level3;
    let insufficient = || RbiError::DataInsufficient {
        level: CalculationLevel::Level3,
        missing: vec!["thickness_measurements".to_string()],
    };

    let Some(data) = data else {
        return Err(insufficient());
    };
    let measurements = data.sorted_measurements();
    if measurements.len() < l3.min_measurement_points {
        return Err(insufficient());
    }

    let first_date = measurements[0].measured_at;
    let span_days = (measurements[measurements.len() - 1].measured_at - first_date).num_days();
    if span_days <= 0 {
        // 同日重复测点不构成时间序列
        return Err(insufficient());
    }

    // 最小二乘: x = 距首测年数, y = 壁厚
    let n = measurements.len() as f64;
    let points: Vec<(f64, f64)> = measurements
        .iter()
        .map(|m| {
            let years = (m.measured_at - first_date).num_days() as f64 / 365.25;
            (years, m.value_mm)
        })
        .collect();

    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return Err(insufficient());
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;

    // 减薄速率: 斜率为负才是减薄
    let rate = (-slope).max(0.0);
    let current_thickness = measurements[measurements.len() - 1].value_mm;
    let margin = (current_thickness - l3.min_allowable_thickness_mm).max(0.0);

    let remaining_life_years = if rate < l3.negligible_rate_mm_per_year {
        // 趋势平稳: 按视界封顶
        l3.horizon_years
    } else {
        (margin / rate).min(l3.horizon_years)
    };

    let pof = (1.0 - remaining_life_years / l3.horizon_years)
        .clamp(l3.pof_floor, l3.pof_ceiling);

    Ok(Level3Outcome {
        pof,
        trend_rate_mm_per_year: rate,
        remaining_life_years,
    })
}
