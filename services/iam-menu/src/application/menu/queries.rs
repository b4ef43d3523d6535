//! 菜单查询参数

use serde::{Deserialize, Serialize};

use crate::domain::menu::MenuStatus;

/// 菜单查询参数
///
/// `code_path` 为以 `.` 或 `/` 连接的代码链，自上而下解析，
/// 末段之前的每一段都必须命中既有节点
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuQueryParams {
    pub name_contains: Option<String>,
    pub status: Option<MenuStatus>,
    pub code_path: Option<String>,
    /// 直接限定子树范围的物化路径前缀
    pub parent_path_prefix: Option<String>,
    pub ids: Vec<i64>,
    /// 结果是否附带资源绑定
    pub include_resources: bool,
}
