// ==========================================
// 设备完整性管理系统 - 设备数据领域模型
// ==========================================
// EquipmentData: 设备主数据 (外部系统拥有, 本库只读)
// ExtractedRBIData: 单次计算的检验数据输入
// ==========================================

use crate::domain::types::{
    CoatingCondition, CriticalityLevel, EquipmentType, InspectionQuality,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ==========================================
// ThicknessMeasurement - 测厚记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThicknessMeasurement {
    /// 测点位置 (如 "CML-01")
    pub location: String,

    /// 壁厚读数 (mm)
    pub value_mm: f64,

    /// 测量日期
    pub measured_at: NaiveDate,

    /// 测量方法 (UT/RT 等, 可选)
    #[serde(default)]
    pub method: Option<String>,
}

// ==========================================
// EquipmentData - 设备主数据
// ==========================================
// 不可变主记录, 由外部持久化协作方提供
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentData {
    /// 设备位号 (如 "101-E-401A")
    pub equipment_id: String,

    /// 设备类型
    pub equipment_type: EquipmentType,

    /// 介质/服务类型 (如 "sour water")
    pub service_type: String,

    /// 投用日期
    #[serde(default)]
    pub installation_date: Option<NaiveDate>,

    /// 设备年龄 (年); 缺省时由投用日期推导
    #[serde(default)]
    pub age_years: Option<f64>,

    /// 设计压力 (MPa)
    #[serde(default)]
    pub design_pressure_mpa: Option<f64>,

    /// 设计温度 (℃)
    #[serde(default)]
    pub design_temperature_c: Option<f64>,

    /// 材质 (如 "316L")
    #[serde(default)]
    pub material: Option<String>,

    /// 关键度等级
    pub criticality: CriticalityLevel,

    /// 介质存量 (吨), CoF 经济维度因子
    #[serde(default)]
    pub inventory_size_t: Option<f64>,
}

impl EquipmentData {
    /// 取设备年龄 (年)
    ///
    /// # 规则
    /// - 显式 age_years 优先
    /// - 否则由投用日期与 today 推导
    /// - 两者皆缺 => None
    pub fn resolved_age_years(&self, today: NaiveDate) -> Option<f64> {
        if let Some(age) = self.age_years {
            return Some(age);
        }
        self.installation_date.map(|d| {
            let days = (today - d).num_days();
            (days as f64 / 365.25).max(0.0)
        })
    }
}

// ==========================================
// ExtractedRBIData - 检验提取数据
// ==========================================
// 每次计算调用由外部采集/录入协作方提供
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedRBIData {
    /// 测厚时间序列
    #[serde(default)]
    pub thickness_measurements: Vec<ThicknessMeasurement>,

    /// 腐蚀速率 (mm/年)
    #[serde(default)]
    pub corrosion_rate_mm_per_year: Option<f64>,

    /// 涂层状态
    #[serde(default)]
    pub coating_condition: Option<CoatingCondition>,

    /// 已识别损伤机理列表 (如 "CUI", "sulfidation")
    #[serde(default)]
    pub damage_mechanisms: Vec<String>,

    /// 上轮检验质量评级
    #[serde(default)]
    pub inspection_quality: Option<InspectionQuality>,

    /// 上次检验日期
    #[serde(default)]
    pub last_inspection_date: Option<NaiveDate>,

    /// 检验发现描述列表
    #[serde(default)]
    pub findings: Vec<String>,

    /// 由采集侧估计 (而非实测) 的参数名
    #[serde(default)]
    pub estimated_parameters: Vec<String>,
}

impl ExtractedRBIData {
    /// 是否存在至少一项检验发现
    ///
    /// Level2 的准入条件: 腐蚀速率 / 涂层状态 / 损伤机理 三者有其一
    pub fn has_any_finding(&self) -> bool {
        self.corrosion_rate_mm_per_year.is_some()
            || self.coating_condition.is_some()
            || !self.damage_mechanisms.is_empty()
    }

    /// 按日期升序排列的测厚序列 (同日保持输入顺序)
    pub fn sorted_measurements(&self) -> Vec<ThicknessMeasurement> {
        let mut sorted = self.thickness_measurements.clone();
        sorted.sort_by_key(|m| m.measured_at);
        sorted
    }

    /// 最近一次测量的年份 (日志用)
    pub fn latest_measurement_year(&self) -> Option<i32> {
        self.thickness_measurements
            .iter()
            .map(|m| m.measured_at)
            .max()
            .map(|d| d.year())
    }
}
