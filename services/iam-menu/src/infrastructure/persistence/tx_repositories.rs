//! 事务态仓储实现
//!
//! 共享同一个打开的事务而非连接池，供 Unit of Work 内的写入使用。

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;
use trellis_errors::{AppError, AppResult};

use super::menu_sql;
use crate::domain::menu::{
    Menu, MenuFilter, MenuRepository, MenuResource, MenuResourceRepository, MenuStatus,
    RoleMenuRepository,
};

/// 共享事务类型
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// 定义持有共享事务的仓储结构
macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxMenuRepository);
define_tx_repo!(TxMenuResourceRepository);
define_tx_repo!(TxRoleMenuRepository);

#[async_trait]
impl MenuRepository for TxMenuRepository {
    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::exists_by_id(&mut **tx, id).await
    }

    async fn exists_code_in_parent(&self, code: &str, parent_id: i64) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::exists_code_in_parent(&mut **tx, code, parent_id).await
    }

    async fn exists_name_in_parent(&self, name: &str, parent_id: i64) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::exists_name_in_parent(&mut **tx, name, parent_id).await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Menu>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::find_by_id(&mut **tx, id).await
    }

    async fn find_by_code_in_parent(&self, code: &str, parent_id: i64) -> AppResult<Option<Menu>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::find_by_code_in_parent(&mut **tx, code, parent_id).await
    }

    async fn find_by_name_in_parent(&self, name: &str, parent_id: i64) -> AppResult<Option<Menu>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::find_by_name_in_parent(&mut **tx, name, parent_id).await
    }

    async fn query(&self, filter: &MenuFilter) -> AppResult<Vec<Menu>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::query_menus(&mut **tx, filter).await
    }

    async fn create(&self, menu: &Menu) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::create_menu(&mut **tx, menu).await
    }

    async fn update(&self, menu: &Menu) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::update_menu(&mut **tx, menu).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::delete_menu(&mut **tx, id).await
    }

    async fn update_parent_path(&self, id: i64, parent_path: &str) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::update_parent_path(&mut **tx, id, parent_path).await
    }

    async fn update_status_by_path_prefix(&self, prefix: &str, status: MenuStatus) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::update_status_by_path_prefix(&mut **tx, prefix, status).await
    }
}

#[async_trait]
impl MenuResourceRepository for TxMenuResourceRepository {
    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::resource_exists_by_id(&mut **tx, id).await
    }

    async fn exists_method_path_in_menu(
        &self,
        method: &str,
        path: &str,
        menu_id: i64,
    ) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::resource_exists_method_path(&mut **tx, method, path, menu_id).await
    }

    async fn list_by_menu(&self, menu_id: i64) -> AppResult<Vec<MenuResource>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::list_resources_by_menu(&mut **tx, menu_id).await
    }

    async fn create(&self, resource: &MenuResource) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::create_resource(&mut **tx, resource).await
    }

    async fn delete_by_menu(&self, menu_id: i64) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::delete_resources_by_menu(&mut **tx, menu_id).await
    }
}

#[async_trait]
impl RoleMenuRepository for TxRoleMenuRepository {
    async fn delete_by_menu(&self, menu_id: i64) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;
        menu_sql::delete_role_menus_by_menu(&mut **tx, menu_id).await
    }
}
