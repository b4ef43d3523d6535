//! 物化路径树工具
//!
//! 树形数据（菜单等）以「祖先 ID 链 + 分隔符」的字符串形式存储路径，
//! 子树范围查询退化为普通的字符串前缀扫描

/// 树路径分隔符
pub const TREE_PATH_DELIMITER: &str = ".";

/// 计算节点的子树前缀：父路径 + 自身 ID + 分隔符
///
/// 该前缀既是所有直接子节点 parent_path 的取值，
/// 也是「该节点全部后代」范围扫描使用的 LIKE 前缀
pub fn tree_path_prefix(parent_path: &str, id: i64) -> String {
    format!("{parent_path}{id}{TREE_PATH_DELIMITER}")
}

/// 解析物化路径中的祖先 ID 链
///
/// 跳过空段和无法解析为数字的碎片
pub fn split_tree_path(path: &str) -> Vec<i64> {
    path.split(TREE_PATH_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| segment.parse::<i64>().ok())
        .collect()
}

/// 子树迁移时的路径改写
///
/// 仅替换第一处旧前缀，保留更深层级的后缀不变
pub fn replace_path_prefix(path: &str, old_prefix: &str, new_prefix: &str) -> String {
    path.replacen(old_prefix, new_prefix, 1)
}
