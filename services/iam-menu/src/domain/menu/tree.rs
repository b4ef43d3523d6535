//! 菜单树装配

use std::collections::{HashMap, HashSet};

use trellis_common::split_tree_path;

use super::entity::Menu;

/// 固定排序：(parent_path 升序, sequence 降序, id 升序)
///
/// id 作为稳定决胜键，sequence 相同的兄弟节点次序可复现
pub fn sort_menus(menus: &mut [Menu]) {
    menus.sort_by(|a, b| {
        a.parent_path
            .cmp(&b.parent_path)
            .then_with(|| b.sequence.cmp(&a.sequence))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// 将排好序的扁平列表装配为森林
///
/// 父节点不在列表中的节点提升为根，搜索结果不会出现悬空碎片
pub fn build_menu_tree(flat: Vec<Menu>) -> Vec<Menu> {
    let present: HashSet<i64> = flat.iter().map(|m| m.id).collect();

    let mut by_parent: HashMap<i64, Vec<Menu>> = HashMap::new();
    for menu in flat {
        let key = if menu.parent_id != 0 && present.contains(&menu.parent_id) {
            menu.parent_id
        } else {
            0
        };
        by_parent.entry(key).or_default().push(menu);
    }

    attach_children(0, &mut by_parent)
}

fn attach_children(parent_id: i64, by_parent: &mut HashMap<i64, Vec<Menu>>) -> Vec<Menu> {
    let mut nodes = by_parent.remove(&parent_id).unwrap_or_default();
    for node in &mut nodes {
        node.children = attach_children(node.id, by_parent);
    }
    nodes
}

/// 收集列表中所有节点的祖先 ID，按首次出现顺序去重
pub fn collect_ancestor_ids(menus: &[Menu]) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for menu in menus {
        for id in split_tree_path(&menu.parent_path) {
            if seen.insert(id) {
                ids.push(id);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::MenuStatus;

    fn menu(id: i64, parent_id: i64, parent_path: &str, sequence: i32) -> Menu {
        let mut m = Menu::new(
            parent_id,
            format!("m{}", id),
            format!("Menu {}", id),
            MenuStatus::Enabled,
            sequence,
        );
        m.id = id;
        m.parent_path = parent_path.to_string();
        m
    }

    #[test]
    fn sort_orders_siblings_by_sequence_then_id() {
        let mut menus = vec![
            menu(3, 0, "", 5),
            menu(1, 0, "", 9),
            menu(4, 0, "", 5),
            menu(2, 0, "", 7),
        ];
        sort_menus(&mut menus);
        let ids: Vec<i64> = menus.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn sort_groups_by_parent_path_first() {
        let mut menus = vec![
            menu(5, 2, "2.", 1),
            menu(1, 0, "", 1),
            menu(3, 1, "1.", 9),
            menu(2, 0, "", 0),
        ];
        sort_menus(&mut menus);
        let ids: Vec<i64> = menus.iter().map(|m| m.id).collect();
        // 根（空路径）在前，随后按路径分组
        assert_eq!(ids, vec![1, 2, 3, 5]);
    }

    #[test]
    fn build_tree_nests_children_under_parents() {
        let flat = vec![
            menu(1, 0, "", 2),
            menu(2, 0, "", 1),
            menu(3, 1, "1.", 0),
            menu(4, 3, "1.3.", 0),
        ];
        let roots = build_menu_tree(flat);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].id, 1);
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].id, 3);
        assert_eq!(roots[0].children[0].children[0].id, 4);
        assert!(roots[1].children.is_empty());
    }

    #[test]
    fn build_tree_promotes_orphans_to_roots() {
        // 父节点 7 不在列表中
        let flat = vec![menu(1, 0, "", 0), menu(9, 7, "7.", 0)];
        let roots = build_menu_tree(flat);
        assert_eq!(roots.len(), 2);
        assert!(roots.iter().any(|m| m.id == 9));
    }

    #[test]
    fn build_tree_keeps_sibling_order_from_input() {
        let mut flat = vec![
            menu(1, 0, "", 1),
            menu(2, 1, "1.", 3),
            menu(3, 1, "1.", 9),
            menu(4, 1, "1.", 3),
        ];
        sort_menus(&mut flat);
        let roots = build_menu_tree(flat);
        let child_ids: Vec<i64> = roots[0].children.iter().map(|m| m.id).collect();
        assert_eq!(child_ids, vec![3, 2, 4]);
    }

    #[test]
    fn collect_ancestor_ids_dedupes_in_order() {
        let menus = vec![menu(4, 3, "1.3.", 0), menu(5, 3, "1.3.", 0), menu(6, 2, "2.", 0)];
        assert_eq!(collect_ancestor_ids(&menus), vec![1, 3, 2]);
    }

    #[test]
    fn collect_ancestor_ids_empty_for_roots() {
        let menus = vec![menu(1, 0, "", 0)];
        assert!(collect_ancestor_ids(&menus).is_empty());
    }
}
