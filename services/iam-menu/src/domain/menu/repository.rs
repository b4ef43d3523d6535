//! 菜单仓储接口

use async_trait::async_trait;
use trellis_errors::AppResult;

use super::entity::{Menu, MenuResource, MenuStatus};

/// 菜单过滤条件
///
/// 所有条件为 AND 语义，`ids` 为空表示不按 ID 过滤
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    /// 名称子串匹配
    pub name_contains: Option<String>,
    pub status: Option<MenuStatus>,
    /// 代码精确匹配
    pub code: Option<String>,
    /// 物化路径前缀，用于子树范围扫描
    pub parent_path_prefix: Option<String>,
    pub ids: Vec<i64>,
}

impl MenuFilter {
    /// 按子树前缀过滤
    pub fn subtree(prefix: impl Into<String>) -> Self {
        Self {
            parent_path_prefix: Some(prefix.into()),
            ..Default::default()
        }
    }

    /// 按 ID 集合过滤
    pub fn by_ids(ids: Vec<i64>) -> Self {
        Self {
            ids,
            ..Default::default()
        }
    }
}

/// 菜单仓储接口
///
/// 查询固定按 (parent_path 升序, sequence 降序, id 升序) 返回
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn exists_by_id(&self, id: i64) -> AppResult<bool>;

    /// 同级下是否已有该代码
    async fn exists_code_in_parent(&self, code: &str, parent_id: i64) -> AppResult<bool>;

    /// 同级下是否已有该名称
    async fn exists_name_in_parent(&self, name: &str, parent_id: i64) -> AppResult<bool>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Menu>>;

    async fn find_by_code_in_parent(&self, code: &str, parent_id: i64) -> AppResult<Option<Menu>>;

    async fn find_by_name_in_parent(&self, name: &str, parent_id: i64) -> AppResult<Option<Menu>>;

    async fn query(&self, filter: &MenuFilter) -> AppResult<Vec<Menu>>;

    /// 创建菜单，返回持久化后的 ID
    ///
    /// `menu.id` 大于 0 时按显式 ID 写入，用于声明式导入
    async fn create(&self, menu: &Menu) -> AppResult<i64>;

    async fn update(&self, menu: &Menu) -> AppResult<()>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// 改写单个节点的物化路径，用于子树迁移
    async fn update_parent_path(&self, id: i64, parent_path: &str) -> AppResult<()>;

    /// 按路径前缀批量改写状态，用于子树级联
    async fn update_status_by_path_prefix(&self, prefix: &str, status: MenuStatus) -> AppResult<()>;
}

/// 菜单资源仓储接口
#[async_trait]
pub trait MenuResourceRepository: Send + Sync {
    async fn exists_by_id(&self, id: i64) -> AppResult<bool>;

    /// 菜单下是否已有相同 方法+路径 的资源
    async fn exists_method_path_in_menu(
        &self,
        method: &str,
        path: &str,
        menu_id: i64,
    ) -> AppResult<bool>;

    /// 菜单下的资源列表，按 (method, path) 排序
    async fn list_by_menu(&self, menu_id: i64) -> AppResult<Vec<MenuResource>>;

    /// 创建资源，返回持久化后的 ID
    async fn create(&self, resource: &MenuResource) -> AppResult<i64>;

    /// 删除菜单下的全部资源
    async fn delete_by_menu(&self, menu_id: i64) -> AppResult<()>;
}

/// 角色-菜单关系仓储接口
#[async_trait]
pub trait RoleMenuRepository: Send + Sync {
    /// 删除引用某菜单的全部角色授权
    async fn delete_by_menu(&self, menu_id: i64) -> AppResult<()>;
}
