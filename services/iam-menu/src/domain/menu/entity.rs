//! 菜单实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trellis_common::tree_path_prefix;

/// 菜单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuStatus {
    /// 启用
    #[default]
    Enabled,
    /// 停用
    Disabled,
}

impl MenuStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for MenuStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MenuStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            other => Err(format!("Invalid menu status '{}'", other)),
        }
    }
}

/// 菜单实体
///
/// `parent_path` 为物化路径：从根到父节点的 ID 链，每段后跟分隔符，
/// 根节点为空串。子树查询与迁移都建立在该前缀之上。
/// `resources` 与 `children` 只在内存中按需装配，不随菜单行持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: i64,
    /// 直接父节点 ID，0 表示根
    pub parent_id: i64,
    pub parent_path: String,
    pub code: String,
    pub name: String,
    pub status: MenuStatus,
    /// 排序权重，同级中越大越靠前
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resources: Vec<MenuResource>,
    pub children: Vec<Menu>,
}

impl Menu {
    pub fn new(parent_id: i64, code: String, name: String, status: MenuStatus, sequence: i32) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            parent_id,
            parent_path: String::new(),
            code,
            name,
            status,
            sequence,
            created_at: now,
            updated_at: now,
            resources: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 本节点的子树前缀，即其直接子节点的 `parent_path` 取值
    pub fn subtree_prefix(&self) -> String {
        tree_path_prefix(&self.parent_path, self.id)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == 0
    }
}

/// 菜单资源：绑定到菜单的一条可授权 API（HTTP 方法 + 路径）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuResource {
    /// 0 表示尚未持久化
    pub id: i64,
    pub menu_id: i64,
    pub method: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 角色-菜单授权关系
///
/// 关系行由角色管理流程写入，本服务只在菜单删除时级联清除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMenu {
    pub id: i64,
    pub role_id: i64,
    pub menu_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
