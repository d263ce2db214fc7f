// ==========================================
// 设备完整性管理系统 - 位号解析与聚类分析器
// ==========================================
// 位号文法: <unit>-<type-code>-<service-number><suffix>
//   例: "101-E-401A" => unit=101, type=E, service=401, suffix=A
// 姊妹设备: unit+type+service 相同, 仅后缀不同 (同一服务的并联列)
// 平行设备: unit+type+suffix 相同, 服务号不同 (跨装置同角色)
// ==========================================
// 红线: 全量分组一次完成后才允许建档,
//       规范家族ID = 组内字典序最小的基准位号,
//       保证聚类结果与分析顺序无关
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// EquipmentTag - 结构化位号
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentTag {
    /// 装置号 (如 "101")
    pub unit: String,
    /// 类型码 (如 "E")
    pub type_code: String,
    /// 服务号 (如 "401")
    pub service: String,
    /// 后缀 (如 "A", 可为空)
    pub suffix: String,
}

impl EquipmentTag {
    /// 解析结构化位号
    ///
    /// # 规则
    /// - 三段, 以 '-' 分隔
    /// - 第三段: 前导数字为服务号, 尾随字母为后缀
    /// - 不满足文法 => None (不报错, 未结构化位号走单例分组)
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.trim().split('-').collect();
        if parts.len() != 3 {
            return None;
        }
        let unit = parts[0];
        let type_code = parts[1];
        let tail = parts[2];

        if unit.is_empty() || !unit.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        if type_code.is_empty() || !type_code.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let service: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
        let suffix: String = tail.chars().skip_while(|c| c.is_ascii_digit()).collect();
        if service.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        Some(Self {
            unit: unit.to_string(),
            type_code: type_code.to_ascii_uppercase(),
            service,
            suffix: suffix.to_ascii_uppercase(),
        })
    }

    /// 基准位号 (去后缀): "101-E-401A" -> "101-E-401"
    pub fn base_tag(&self) -> String {
        format!("{}-{}-{}", self.unit, self.type_code, self.service)
    }

    /// 姊妹关系: unit+type+service 相同, 仅后缀不同
    pub fn is_sister_of(&self, other: &EquipmentTag) -> bool {
        self.unit == other.unit
            && self.type_code == other.type_code
            && self.service == other.service
    }

    /// 平行关系: unit+type+suffix 相同, 服务号不同
    ///
    /// 空后缀代表单列设备, 不构成平行列
    pub fn is_parallel_of(&self, other: &EquipmentTag) -> bool {
        !self.suffix.is_empty()
            && self.unit == other.unit
            && self.type_code == other.type_code
            && self.suffix == other.suffix
            && self.service != other.service
    }
}

// ==========================================
// TagGroup - 聚类分组结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagGroup {
    /// 规范家族ID (组内字典序最小的基准位号;
    /// 未结构化位号的单例组取位号本身)
    pub canonical_id: String,

    /// 成员位号集合
    pub members: BTreeSet<String>,

    /// 组内覆盖的基准位号
    pub base_tags: BTreeSet<String>,
}

// ==========================================
// 并查集 (姊妹/平行关系的传递闭包)
// ==========================================
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

// ==========================================
// TagGroupingAnalyzer - 位号聚类分析器
// ==========================================
pub struct TagGroupingAnalyzer;

impl TagGroupingAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 全量分组: 把设备总体划分为互不相交的家族组
    ///
    /// # 规则
    /// - 姊妹∪平行关系做传递闭包 (并查集)
    /// - 未结构化位号各成单例组
    /// - 输出按规范ID排序, 与输入顺序无关 (幂等)
    pub fn group(&self, equipment_ids: &[String]) -> Vec<TagGroup> {
        // 去重, 保证集合语义
        let ids: Vec<String> = {
            let set: BTreeSet<String> = equipment_ids.iter().cloned().collect();
            set.into_iter().collect()
        };

        let tags: Vec<Option<EquipmentTag>> =
            ids.iter().map(|id| EquipmentTag::parse(id)).collect();

        let mut uf = UnionFind::new(ids.len());
        for i in 0..ids.len() {
            let Some(tag_i) = &tags[i] else { continue };
            for j in (i + 1)..ids.len() {
                let Some(tag_j) = &tags[j] else { continue };
                if tag_i.is_sister_of(tag_j) || tag_i.is_parallel_of(tag_j) {
                    uf.union(i, j);
                }
            }
        }

        // 按根节点归并
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..ids.len() {
            let root = uf.find(i);
            groups.entry(root).or_default().push(i);
        }

        let mut result: Vec<TagGroup> = groups
            .into_values()
            .map(|indices| {
                let members: BTreeSet<String> =
                    indices.iter().map(|&i| ids[i].clone()).collect();
                let base_tags: BTreeSet<String> = indices
                    .iter()
                    .filter_map(|&i| tags[i].as_ref().map(|t| t.base_tag()))
                    .collect();
                // 规范ID: 字典序最小的基准位号 (BTreeSet 首元素)
                let canonical_id = base_tags
                    .iter()
                    .next()
                    .cloned()
                    .unwrap_or_else(|| {
                        members.iter().next().cloned().unwrap_or_default()
                    });
                TagGroup {
                    canonical_id,
                    members,
                    base_tags,
                }
            })
            .collect();

        result.sort_by(|a, b| a.canonical_id.cmp(&b.canonical_id));
        result
    }
}

impl Default for TagGroupingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_tag() {
        let tag = EquipmentTag::parse("101-E-401A").unwrap();
        assert_eq!(tag.unit, "101");
        assert_eq!(tag.type_code, "E");
        assert_eq!(tag.service, "401");
        assert_eq!(tag.suffix, "A");
        assert_eq!(tag.base_tag(), "101-E-401");
    }

    #[test]
    fn test_parse_no_suffix() {
        let tag = EquipmentTag::parse("205-V-12").unwrap();
        assert_eq!(tag.suffix, "");
        assert_eq!(tag.base_tag(), "205-V-12");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(EquipmentTag::parse("PUMP-7").is_none());
        assert!(EquipmentTag::parse("101-E-").is_none());
        assert!(EquipmentTag::parse("101--401A").is_none());
        assert!(EquipmentTag::parse("").is_none());
    }

    #[test]
    fn test_sister_and_parallel_relations() {
        let a = EquipmentTag::parse("101-E-401A").unwrap();
        let b = EquipmentTag::parse("101-E-401B").unwrap();
        let c = EquipmentTag::parse("101-E-402A").unwrap();
        assert!(a.is_sister_of(&b));
        assert!(!a.is_sister_of(&c));
        assert!(a.is_parallel_of(&c));
        assert!(!a.is_parallel_of(&b));
    }

    #[test]
    fn test_grouping_is_order_independent() {
        let forward: Vec<String> = ["101-E-401A", "101-E-401B", "101-E-401C"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let analyzer = TagGroupingAnalyzer::new();
        let g1 = analyzer.group(&forward);
        let g2 = analyzer.group(&reversed);

        assert_eq!(g1.len(), 1);
        assert_eq!(g2.len(), 1);
        assert_eq!(g1[0].canonical_id, "101-E-401");
        assert_eq!(g1[0].canonical_id, g2[0].canonical_id);
        assert_eq!(g1[0].members, g2[0].members);
    }

    #[test]
    fn test_parallel_bridges_groups() {
        // 401A/401B 姊妹; 402A 经 401A 平行桥接 => 同一组
        let ids: Vec<String> = ["101-E-401A", "101-E-401B", "101-E-402A"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let groups = TagGroupingAnalyzer::new().group(&ids);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].canonical_id, "101-E-401");
        assert_eq!(groups[0].members.len(), 3);
    }

    #[test]
    fn test_unstructured_tags_are_singletons() {
        let ids: Vec<String> = ["101-E-401A", "BOILER-7", "101-E-401B"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let groups = TagGroupingAnalyzer::new().group(&ids);
        assert_eq!(groups.len(), 2);
        let singleton = groups
            .iter()
            .find(|g| g.canonical_id == "BOILER-7")
            .unwrap();
        assert_eq!(singleton.members.len(), 1);
    }
}
