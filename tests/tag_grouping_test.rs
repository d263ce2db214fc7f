// ==========================================
// 位号解析与聚类 集成测试
// ==========================================
// 测试目标: 位号文法解析 + 姊妹/平行聚类的幂等性
// 覆盖范围: 标准位号/无后缀位号/非结构化位号/乱序分组
// ==========================================

use plant_integrity_rbi::engine::tag::{EquipmentTag, TagGroupingAnalyzer};

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

// ==========================================
// 测试用例 1: 位号解析
// ==========================================

#[test]
fn test_parse_reference_tag() {
    let tag = EquipmentTag::parse("101-E-401A").expect("标准位号应可解析");
    assert_eq!(tag.unit, "101");
    assert_eq!(tag.type_code, "E");
    assert_eq!(tag.service, "401");
    assert_eq!(tag.suffix, "A");
    // 基准位号还原
    assert_eq!(tag.base_tag(), "101-E-401");
}

#[test]
fn test_parse_lowercase_normalized() {
    let tag = EquipmentTag::parse("101-e-401a").expect("小写位号应可解析");
    assert_eq!(tag.type_code, "E");
    assert_eq!(tag.suffix, "A");
}

// ==========================================
// 测试用例 2: 姊妹组聚类幂等
// ==========================================

#[test]
fn test_sister_group_single_family_any_order() {
    let analyzer = TagGroupingAnalyzer::new();
    let orderings = [
        ids(&["101-E-401A", "101-E-401B", "101-E-401C"]),
        ids(&["101-E-401C", "101-E-401A", "101-E-401B"]),
        ids(&["101-E-401B", "101-E-401C", "101-E-401A"]),
    ];

    for ordering in &orderings {
        let groups = analyzer.group(ordering);
        assert_eq!(groups.len(), 1, "姊妹组必须聚成唯一家族");
        assert_eq!(groups[0].canonical_id, "101-E-401");
        assert_eq!(groups[0].members.len(), 3);
    }
}

// ==========================================
// 测试用例 3: 平行关系桥接
// ==========================================

#[test]
fn test_parallel_relation_merges_services() {
    // 101-E-401A 与 101-E-402A 平行 (同后缀不同服务号)
    let groups = TagGroupingAnalyzer::new().group(&ids(&[
        "101-E-401A",
        "101-E-401B",
        "101-E-402A",
        "101-E-402B",
    ]));
    assert_eq!(groups.len(), 1);
    // 规范ID取字典序最小基准位号
    assert_eq!(groups[0].canonical_id, "101-E-401");
    assert_eq!(groups[0].members.len(), 4);
}

#[test]
fn test_unrelated_units_stay_apart() {
    let groups = TagGroupingAnalyzer::new().group(&ids(&[
        "101-E-401A",
        "101-E-401B",
        "205-V-12",
        "205-V-13",
    ]));
    // 205-V-12 与 205-V-13: 同装置同类型但服务号与后缀都不同 => 不related
    assert_eq!(groups.len(), 3);
}

// ==========================================
// 测试用例 4: 重复输入的集合语义
// ==========================================

#[test]
fn test_duplicate_ids_deduplicated() {
    let groups = TagGroupingAnalyzer::new().group(&ids(&[
        "101-E-401A",
        "101-E-401A",
        "101-E-401B",
    ]));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members.len(), 2);
}
