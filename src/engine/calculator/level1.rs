// ==========================================
// 设备完整性管理系统 - 等级1 计算 (仅主数据)
// ==========================================
// 保底等级: 只依赖设备类型/服务/年龄, 永远可算
// ==========================================

use crate::config::RbiConfig;
use crate::domain::equipment::EquipmentData;
use crate::domain::types::clamp01;
use chrono::NaiveDate;

use super::level2;

/// 等级1 计算输出
pub(super) struct Level1Outcome {
    pub pof: f64,
    /// 评分说明 (可解释性)
    pub components: Vec<String>,
}

/// 等级1 PoF 计算
///
/// # 规则
/// - 基础分 + 年龄分档加分 + 腐蚀性介质加分
/// - 年龄未知按保守加分计
pub(super) fn compute(
    equipment: &EquipmentData,
    config: &RbiConfig,
    today: NaiveDate,
) -> Level1Outcome {
    let l1 = &config.level1;
    let mut components = vec![format!("base {:.2}", l1.base_pof)];

    let age_score = match equipment.resolved_age_years(today) {
        Some(age) if age < l1.young_age_years => {
            components.push(format!("age {:.0}y (young) => +0.00", age));
            0.0
        }
        Some(age) if age < l1.mid_age_years => {
            components.push(format!("age {:.0}y (mid) => +{:.2}", age, l1.mid_age_score));
            l1.mid_age_score
        }
        Some(age) if age < l1.old_age_years => {
            components.push(format!("age {:.0}y (old) => +{:.2}", age, l1.old_age_score));
            l1.old_age_score
        }
        Some(age) => {
            components.push(format!(
                "age {:.0}y (very old) => +{:.2}",
                age, l1.very_old_age_score
            ));
            l1.very_old_age_score
        }
        None => {
            components.push(format!("age unknown => +{:.2} (保守)", l1.unknown_age_score));
            l1.unknown_age_score
        }
    };

    // 危害介质抬升基础 PoF
    let service_bonus = if level2::service_environmental_score(&equipment.service_type) >= 0.7 {
        components.push(format!(
            "corrosive service => +{:.2}",
            l1.corrosive_service_bonus
        ));
        l1.corrosive_service_bonus
    } else {
        0.0
    };

    Level1Outcome {
        pof: clamp01(l1.base_pof + age_score + service_bonus),
        components,
    }
}
