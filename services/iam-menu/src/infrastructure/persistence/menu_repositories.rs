//! PostgreSQL 菜单仓储实现（连接池）
//!
//! 读路径直接走连接池；事务内写入见 `tx_repositories`。

use async_trait::async_trait;
use sqlx::PgPool;
use trellis_errors::AppResult;

use super::menu_sql;
use crate::domain::menu::{
    Menu, MenuFilter, MenuRepository, MenuResource, MenuResourceRepository, MenuStatus,
};

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        menu_sql::exists_by_id(&self.pool, id).await
    }

    async fn exists_code_in_parent(&self, code: &str, parent_id: i64) -> AppResult<bool> {
        menu_sql::exists_code_in_parent(&self.pool, code, parent_id).await
    }

    async fn exists_name_in_parent(&self, name: &str, parent_id: i64) -> AppResult<bool> {
        menu_sql::exists_name_in_parent(&self.pool, name, parent_id).await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Menu>> {
        menu_sql::find_by_id(&self.pool, id).await
    }

    async fn find_by_code_in_parent(&self, code: &str, parent_id: i64) -> AppResult<Option<Menu>> {
        menu_sql::find_by_code_in_parent(&self.pool, code, parent_id).await
    }

    async fn find_by_name_in_parent(&self, name: &str, parent_id: i64) -> AppResult<Option<Menu>> {
        menu_sql::find_by_name_in_parent(&self.pool, name, parent_id).await
    }

    async fn query(&self, filter: &MenuFilter) -> AppResult<Vec<Menu>> {
        menu_sql::query_menus(&self.pool, filter).await
    }

    async fn create(&self, menu: &Menu) -> AppResult<i64> {
        menu_sql::create_menu(&self.pool, menu).await
    }

    async fn update(&self, menu: &Menu) -> AppResult<()> {
        menu_sql::update_menu(&self.pool, menu).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        menu_sql::delete_menu(&self.pool, id).await
    }

    async fn update_parent_path(&self, id: i64, parent_path: &str) -> AppResult<()> {
        menu_sql::update_parent_path(&self.pool, id, parent_path).await
    }

    async fn update_status_by_path_prefix(&self, prefix: &str, status: MenuStatus) -> AppResult<()> {
        menu_sql::update_status_by_path_prefix(&self.pool, prefix, status).await
    }
}

pub struct PgMenuResourceRepository {
    pool: PgPool,
}

impl PgMenuResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuResourceRepository for PgMenuResourceRepository {
    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        menu_sql::resource_exists_by_id(&self.pool, id).await
    }

    async fn exists_method_path_in_menu(
        &self,
        method: &str,
        path: &str,
        menu_id: i64,
    ) -> AppResult<bool> {
        menu_sql::resource_exists_method_path(&self.pool, method, path, menu_id).await
    }

    async fn list_by_menu(&self, menu_id: i64) -> AppResult<Vec<MenuResource>> {
        menu_sql::list_resources_by_menu(&self.pool, menu_id).await
    }

    async fn create(&self, resource: &MenuResource) -> AppResult<i64> {
        menu_sql::create_resource(&self.pool, resource).await
    }

    async fn delete_by_menu(&self, menu_id: i64) -> AppResult<()> {
        menu_sql::delete_resources_by_menu(&self.pool, menu_id).await
    }
}
