// ==========================================
// 设备完整性管理系统 - 风险矩阵
// ==========================================
// 依据: API RP 581 - 4x4 风险矩阵
// 红线: 查表纯函数, 同输入必同输出
// ==========================================

use crate::domain::types::RiskLevel;

/// PoF/CoF 输入档位 (四分位)
fn band(score: f64) -> usize {
    if score < 0.25 {
        0
    } else if score < 0.5 {
        1
    } else if score < 0.75 {
        2
    } else {
        3
    }
}

fn band_name(index: usize) -> &'static str {
    match index {
        0 => "低",
        1 => "中",
        2 => "高",
        _ => "极高",
    }
}

/// 固定风险矩阵: 行 = PoF 档, 列 = CoF 档
///
/// 沿两个维度单调不减
const RISK_MATRIX: [[RiskLevel; 4]; 4] = [
    // CoF:      低               中                高               极高
    /* PoF 低 */
    [RiskLevel::Low, RiskLevel::Low, RiskLevel::Medium, RiskLevel::High],
    /* PoF 中 */
    [RiskLevel::Low, RiskLevel::Medium, RiskLevel::Medium, RiskLevel::High],
    /* PoF 高 */
    [RiskLevel::Medium, RiskLevel::High, RiskLevel::High, RiskLevel::VeryHigh],
    /* PoF 极高 */
    [RiskLevel::High, RiskLevel::VeryHigh, RiskLevel::VeryHigh, RiskLevel::VeryHigh],
];

/// 风险等级查表
///
/// # 返回
/// (风险等级, 评定原因)
pub(super) fn risk_level(pof: f64, cof_max: f64) -> (RiskLevel, String) {
    let pof_band = band(pof);
    let cof_band = band(cof_max);
    let level = RISK_MATRIX[pof_band][cof_band];
    let reason = format!(
        "PoF {:.2} ({}) × CoF {:.2} ({}) => {}",
        pof,
        band_name(pof_band),
        cof_max,
        band_name(cof_band),
        level
    );
    (level, reason)
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_is_deterministic() {
        let (l1, _) = risk_level(0.55, 0.45);
        let (l2, _) = risk_level(0.55, 0.45);
        assert_eq!(l1, l2);
        assert_eq!(l1, RiskLevel::High);
    }

    #[test]
    fn test_matrix_monotone_in_both_axes() {
        let probes = [0.1, 0.3, 0.6, 0.9];
        for (i, &p) in probes.iter().enumerate() {
            for (j, &c) in probes.iter().enumerate() {
                let (level, _) = risk_level(p, c);
                if i + 1 < probes.len() {
                    let (next, _) = risk_level(probes[i + 1], c);
                    assert!(next >= level, "PoF 升高不得降低风险");
                }
                if j + 1 < probes.len() {
                    let (next, _) = risk_level(p, probes[j + 1]);
                    assert!(next >= level, "CoF 升高不得降低风险");
                }
            }
        }
    }

    #[test]
    fn test_extremes() {
        assert_eq!(risk_level(0.0, 0.0).0, RiskLevel::Low);
        assert_eq!(risk_level(1.0, 1.0).0, RiskLevel::VeryHigh);
    }
}
