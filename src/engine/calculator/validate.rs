// ==========================================
// 设备完整性管理系统 - 输入校验
// ==========================================
// 红线: 数值非法 (负壁厚等) 立即报错并指明字段,
//       不进入回退流程
// ==========================================

use crate::domain::equipment::{EquipmentData, ExtractedRBIData};
use crate::engine::error::RbiError;

fn check_non_negative(field: &str, value: f64) -> Result<(), RbiError> {
    if !value.is_finite() {
        return Err(RbiError::Validation {
            field: field.to_string(),
            message: format!("必须为有限数值, 实际 {}", value),
        });
    }
    if value < 0.0 {
        return Err(RbiError::Validation {
            field: field.to_string(),
            message: format!("不得为负, 实际 {}", value),
        });
    }
    Ok(())
}

/// 计算前输入校验
pub(super) fn validate_inputs(
    equipment: &EquipmentData,
    data: Option<&ExtractedRBIData>,
) -> Result<(), RbiError> {
    if let Some(age) = equipment.age_years {
        check_non_negative("age_years", age)?;
    }
    if let Some(p) = equipment.design_pressure_mpa {
        check_non_negative("design_pressure_mpa", p)?;
    }
    if let Some(t) = equipment.design_temperature_c {
        if !t.is_finite() {
            return Err(RbiError::Validation {
                field: "design_temperature_c".to_string(),
                message: format!("必须为有限数值, 实际 {}", t),
            });
        }
    }
    if let Some(inv) = equipment.inventory_size_t {
        check_non_negative("inventory_size_t", inv)?;
    }

    let Some(data) = data else {
        return Ok(());
    };

    if let Some(rate) = data.corrosion_rate_mm_per_year {
        check_non_negative("corrosion_rate_mm_per_year", rate)?;
    }
    for (i, m) in data.thickness_measurements.iter().enumerate() {
        if !m.value_mm.is_finite() || m.value_mm <= 0.0 {
            return Err(RbiError::Validation {
                field: format!("thickness_measurements[{}].value_mm", i),
                message: format!("壁厚必须为正, 实际 {}", m.value_mm),
            });
        }
    }

    Ok(())
}
