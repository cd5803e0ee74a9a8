//! 权限树辅助函数

use crate::models::PermissionNode;
use std::collections::HashMap;

/// 展平为先序列表，结果中的节点不再携带 children
pub fn flatten(tree: &[PermissionNode]) -> Vec<PermissionNode> {
    let mut out = Vec::new();
    for root in tree {
        root.walk(&mut |node| {
            let mut leaf = node.clone();
            leaf.children = Vec::new();
            out.push(leaf);
        });
    }
    out
}

/// 按 parent_id 组装平铺列表；找不到父节点的视为根节点，同级按 sort_order 排序
pub fn build_tree(flat: Vec<PermissionNode>) -> Vec<PermissionNode> {
    let ids: std::collections::HashSet<i64> = flat.iter().map(|n| n.id).collect();
    let mut by_parent: HashMap<i64, Vec<PermissionNode>> = HashMap::new();
    let mut roots = Vec::new();

    for mut node in flat {
        node.children = Vec::new();
        if node.parent_id != node.id && ids.contains(&node.parent_id) {
            by_parent.entry(node.parent_id).or_default().push(node);
        } else {
            roots.push(node);
        }
    }

    fn attach(node: &mut PermissionNode, by_parent: &mut HashMap<i64, Vec<PermissionNode>>) {
        if let Some(mut children) = by_parent.remove(&node.id) {
            for child in children.iter_mut() {
                attach(child, by_parent);
            }
            children.sort_by_key(|c| c.sort_order);
            node.children = children;
        }
    }

    for root in roots.iter_mut() {
        attach(root, &mut by_parent);
    }

    // 剩下的节点处在环中，提升为根节点
    while let Some(parent_id) = by_parent.keys().next().copied() {
        let Some(group) = by_parent.remove(&parent_id) else {
            break;
        };
        for mut node in group {
            attach(&mut node, &mut by_parent);
            roots.push(node);
        }
    }
    roots.sort_by_key(|r| r.sort_order);
    roots
}

/// 收集树中所有权限编码
pub fn collect_codes(tree: &[PermissionNode]) -> Vec<String> {
    let mut codes = Vec::new();
    for root in tree {
        root.walk(&mut |node| codes.push(node.code.clone()));
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PermissionKind;

    fn node(id: i64, parent_id: i64, sort: i32) -> PermissionNode {
        PermissionNode {
            id,
            name: format!("n{}", id),
            code: format!("p:{}", id),
            kind: PermissionKind::Menu,
            parent_id,
            route_path: None,
            component_ref: None,
            icon: None,
            sort_order: sort,
            enabled: true,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_build_tree_orders_siblings() {
        let flat = vec![node(3, 1, 2), node(1, 0, 1), node(2, 1, 1), node(4, 0, 0)];
        let tree = build_tree(flat);
        assert_eq!(tree.iter().map(|n| n.id).collect::<Vec<_>>(), vec![4, 1]);
        assert_eq!(tree[1].children.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_flatten_then_build_restores_shape() {
        let tree = build_tree(vec![node(1, 0, 0), node(2, 1, 0), node(3, 2, 0)]);
        let flat = flatten(&tree);
        assert_eq!(flat.len(), 3);
        assert!(flat.iter().all(|n| n.children.is_empty()));

        let rebuilt = build_tree(flat);
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn test_self_parent_treated_as_root() {
        let tree = build_tree(vec![node(5, 5, 0)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(collect_codes(&tree), vec!["p:5".to_string()]);
    }

    #[test]
    fn test_cycle_members_are_kept() {
        let tree = build_tree(vec![node(1, 2, 0), node(2, 1, 0), node(3, 0, 1)]);
        let mut codes = collect_codes(&tree);
        codes.sort();
        assert_eq!(codes, vec!["p:1", "p:2", "p:3"]);
        assert_eq!(tree.len(), 2);
    }
}
