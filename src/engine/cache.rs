// ==========================================
// 设备完整性管理系统 - 计算结果缓存
// ==========================================
// 职责: 纯函数计算的有界缓存
// 键: 值相等键 (设备 + 请求等级 + 输入指纹 + 注册表代数)
// 失效: 注册表任何变更使代数前进, 旧键自然失配,
//       由 LRU 淘汰, 不做进程生命周期常驻
// ==========================================

use crate::domain::equipment::{EquipmentData, ExtractedRBIData};
use crate::domain::result::CalculationResult;
use crate::domain::types::CalculationLevel;
use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Mutex;

// ==========================================
// CalcKey - 值相等缓存键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalcKey {
    pub equipment_id: String,
    pub requested_level: CalculationLevel,
    /// 输入数据指纹 (序列化哈希)
    pub input_fingerprint: u64,
    /// 注册表变更代数
    pub registry_generation: u64,
}

impl CalcKey {
    /// 由输入构造缓存键
    pub fn build(
        equipment: &EquipmentData,
        data: Option<&ExtractedRBIData>,
        requested_level: CalculationLevel,
        registry_generation: u64,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        if let Ok(s) = serde_json::to_string(equipment) {
            s.hash(&mut hasher);
        }
        match data {
            Some(d) => {
                if let Ok(s) = serde_json::to_string(d) {
                    s.hash(&mut hasher);
                }
            }
            None => "no-extracted-data".hash(&mut hasher),
        }

        Self {
            equipment_id: equipment.equipment_id.clone(),
            requested_level,
            input_fingerprint: hasher.finish(),
            registry_generation,
        }
    }
}

// ==========================================
// CalcCache - 有界 LRU 缓存
// ==========================================
pub struct CalcCache {
    inner: Mutex<LruCache<CalcKey, CalculationResult>>,
}

impl CalcCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get(&self, key: &CalcKey) -> Option<CalculationResult> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: CalcKey, result: CalculationResult) {
        self.inner.lock().unwrap().put(key, result);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CriticalityLevel, EquipmentType};

    fn sample_equipment(id: &str) -> EquipmentData {
        EquipmentData {
            equipment_id: id.to_string(),
            equipment_type: EquipmentType::Exchanger,
            service_type: "crude oil".to_string(),
            installation_date: None,
            age_years: Some(10.0),
            design_pressure_mpa: Some(2.0),
            design_temperature_c: Some(150.0),
            material: None,
            criticality: CriticalityLevel::Medium,
            inventory_size_t: None,
        }
    }

    #[test]
    fn test_same_input_same_key() {
        let e = sample_equipment("101-E-401A");
        let k1 = CalcKey::build(&e, None, CalculationLevel::Level2, 5);
        let k2 = CalcKey::build(&e, None, CalculationLevel::Level2, 5);
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_registry_generation_invalidates_key() {
        let e = sample_equipment("101-E-401A");
        let k1 = CalcKey::build(&e, None, CalculationLevel::Level2, 5);
        let k2 = CalcKey::build(&e, None, CalculationLevel::Level2, 6);
        assert_ne!(k1, k2);
    }

    fn sample_result(id: &str) -> CalculationResult {
        use crate::domain::result::CofScores;
        use crate::domain::types::RiskLevel;
        use chrono::{NaiveDate, Utc};

        CalculationResult {
            calculation_id: "test".to_string(),
            equipment_id: id.to_string(),
            requested_level: CalculationLevel::Level1,
            achieved_level: CalculationLevel::Level1,
            fallback_occurred: false,
            pof_score: 0.3,
            cof_scores: CofScores {
                safety: 0.4,
                environmental: 0.3,
                economic: 0.3,
            },
            risk_level: RiskLevel::Low,
            risk_reason: "测试".to_string(),
            confidence_score: 0.5,
            data_quality_score: 0.5,
            inspection_interval_months: 48,
            next_inspection_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            missing_data: Vec::new(),
            estimated_parameters: Vec::new(),
            input_snapshot: serde_json::json!({}),
            calculated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_capacity_bound() {
        let cache = CalcCache::new(2);
        for id in ["101-E-401A", "101-E-401B", "101-E-401C"] {
            let e = sample_equipment(id);
            let key = CalcKey::build(&e, None, CalculationLevel::Level1, 0);
            cache.put(key, sample_result(id));
        }
        assert_eq!(cache.len(), 2);
    }
}
