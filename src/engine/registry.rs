// ==========================================
// 设备完整性管理系统 - 家族/模式注册表
// ==========================================
// 职责: 家族与劣化模式的共享只读视图 + 串行变更
// 红线: 注册表由引擎实例持有并注入, 不做模块级全局,
//       独立实例之间不得共享隐式状态
// ==========================================
// 并发模型: 读多写少; 写路径整条记录替换,
//           读方只会看到变更前或变更后的完整记录
// 变更代数: 每次变更自增 generation, 供计算缓存失效
// ==========================================

use crate::domain::family::{DegradationPattern, EquipmentFamily, RegistrySnapshot};
use crate::domain::types::EquipmentType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::{debug, warn};

// ==========================================
// ImportReport - 快照导入报告
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// 成功导入的家族数
    pub families_imported: usize,
    /// 成功导入的模式数
    pub patterns_imported: usize,
    /// 被跳过的条目 (ID + 原因)
    pub skipped: Vec<String>,
}

// ==========================================
// PatternRegistry - 注册表
// ==========================================
pub struct PatternRegistry {
    families: RwLock<HashMap<String, EquipmentFamily>>,
    patterns: RwLock<HashMap<String, DegradationPattern>>,
    generation: AtomicU64,
}

impl PatternRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self {
            families: RwLock::new(HashMap::new()),
            patterns: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// 预置常见介质劣化模式的注册表
    ///
    /// 学习回路启动前的冷启动知识, 置信度从 0.5 起步
    pub fn with_builtin_patterns() -> Self {
        let registry = Self::new();
        for pattern in builtin_patterns() {
            registry.upsert_pattern(pattern);
        }
        registry
    }

    // ==========================================
    // 读路径 (整条记录克隆)
    // ==========================================

    pub fn family(&self, family_id: &str) -> Option<EquipmentFamily> {
        self.families.read().unwrap().get(family_id).cloned()
    }

    pub fn families(&self) -> Vec<EquipmentFamily> {
        self.families.read().unwrap().values().cloned().collect()
    }

    pub fn family_count(&self) -> usize {
        self.families.read().unwrap().len()
    }

    pub fn pattern(&self, pattern_id: &str) -> Option<DegradationPattern> {
        self.patterns.read().unwrap().get(pattern_id).cloned()
    }

    pub fn patterns(&self) -> Vec<DegradationPattern> {
        self.patterns.read().unwrap().values().cloned().collect()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.read().unwrap().len()
    }

    /// 当前变更代数 (缓存键成分)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    // ==========================================
    // 写路径 (整条替换 + 代数自增)
    // ==========================================

    pub fn upsert_family(&self, family: EquipmentFamily) {
        {
            let mut guard = self.families.write().unwrap();
            guard.insert(family.family_id.clone(), family);
        }
        self.generation.fetch_add(1, Ordering::Release);
    }

    pub fn upsert_pattern(&self, pattern: DegradationPattern) {
        {
            let mut guard = self.patterns.write().unwrap();
            guard.insert(pattern.pattern_id.clone(), pattern);
        }
        self.generation.fetch_add(1, Ordering::Release);
    }

    // ==========================================
    // 快照导出/导入
    // ==========================================

    /// 导出为可序列化快照 (按ID嵌套映射)
    pub fn export(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            families: self
                .families
                .read()
                .unwrap()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            patterns: self
                .patterns
                .read()
                .unwrap()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// 从 JSON 快照导入
    ///
    /// # 规则
    /// - 可选字段缺失 => 按默认值补齐 (serde default), 不报错
    /// - 单条结构非法 => 记录原因并跳过, 其余条目继续导入
    /// - 合法条目整条替换既有记录
    pub fn import_snapshot(&self, snapshot: &serde_json::Value) -> ImportReport {
        let mut report = ImportReport::default();

        let empty = serde_json::Map::new();
        let families = snapshot
            .get("families")
            .and_then(|v| v.as_object())
            .unwrap_or(&empty);
        for (id, value) in families {
            match serde_json::from_value::<EquipmentFamily>(value.clone()) {
                Ok(mut family) => {
                    // 键名优先于条目内字段, 保证映射自洽
                    family.family_id = id.clone();
                    self.upsert_family(family);
                    report.families_imported += 1;
                }
                Err(e) => {
                    warn!(family_id = %id, reason = %e, "家族快照条目非法, 已跳过");
                    report.skipped.push(format!("family {}: {}", id, e));
                }
            }
        }

        let patterns = snapshot
            .get("patterns")
            .and_then(|v| v.as_object())
            .unwrap_or(&empty);
        for (id, value) in patterns {
            match serde_json::from_value::<DegradationPattern>(value.clone()) {
                Ok(mut pattern) => {
                    pattern.pattern_id = id.clone();
                    self.upsert_pattern(pattern);
                    report.patterns_imported += 1;
                }
                Err(e) => {
                    warn!(pattern_id = %id, reason = %e, "模式快照条目非法, 已跳过");
                    report.skipped.push(format!("pattern {}: {}", id, e));
                }
            }
        }

        debug!(
            families = report.families_imported,
            patterns = report.patterns_imported,
            skipped = report.skipped.len(),
            "快照导入完成"
        );
        report
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 内置劣化模式 (冷启动知识)
// ==========================================
fn builtin_patterns() -> Vec<DegradationPattern> {
    use crate::domain::family::AgeRatePoint;
    use chrono::Utc;
    use std::collections::{BTreeMap, BTreeSet};

    let now = Utc::now().naive_utc();

    let make = |pattern_id: &str,
                service_type: &str,
                equipment_types: &[EquipmentType],
                damage_mechanism: &str,
                characteristics: &[&str],
                mitigations: &[&str],
                curve: &[(f64, f64)]| {
        DegradationPattern {
            pattern_id: pattern_id.to_string(),
            service_type: service_type.to_string(),
            equipment_types: equipment_types.iter().copied().collect::<BTreeSet<_>>(),
            characteristics: characteristics.iter().map(|s| s.to_string()).collect(),
            risk_factors: BTreeMap::new(),
            age_rate_curve: curve
                .iter()
                .map(|&(age_years, rate_factor)| AgeRatePoint {
                    age_years,
                    rate_factor,
                })
                .collect(),
            environmental_factors: Vec::new(),
            mitigation_strategies: mitigations.iter().map(|s| s.to_string()).collect(),
            damage_mechanism: damage_mechanism.to_string(),
            confidence_score: 0.5,
            evidence: Vec::new(),
            observation_count: 0,
            updated_at: now,
        }
    };

    vec![
        make(
            "DP-SOUR-WATER",
            "sour water",
            &[EquipmentType::Vessel, EquipmentType::Exchanger, EquipmentType::Piping],
            "wet H2S damage",
            &["氢致开裂倾向", "低流速部位局部减薄"],
            &["WFMT 检测", "控制 H2S 分压"],
            &[(0.0, 0.2), (10.0, 0.5), (25.0, 0.8)],
        ),
        make(
            "DP-AMINE",
            "amine",
            &[EquipmentType::Vessel, EquipmentType::Exchanger],
            "amine corrosion",
            &["贫/富胺液分界面腐蚀", "焊缝优先"],
            &["贫胺温度控制", "焊后热处理"],
            &[(0.0, 0.15), (8.0, 0.4), (20.0, 0.7)],
        ),
        make(
            "DP-CUI",
            "steam",
            &[EquipmentType::Piping, EquipmentType::Vessel, EquipmentType::Tank],
            "CUI",
            &["保温层下外腐蚀", "间歇运行温度区间高发"],
            &["保温层抽检", "外防腐涂层修复"],
            &[(0.0, 0.1), (5.0, 0.35), (15.0, 0.65), (30.0, 0.85)],
        ),
        make(
            "DP-SULFIDATION",
            "crude oil",
            &[EquipmentType::Piping, EquipmentType::Exchanger, EquipmentType::Column],
            "sulfidation",
            &["高温硫腐蚀", "240℃ 以上均匀减薄"],
            &["材质升级 (Cr-Mo)", "硫含量监控"],
            &[(0.0, 0.2), (12.0, 0.5), (30.0, 0.75)],
        ),
    ]
}
