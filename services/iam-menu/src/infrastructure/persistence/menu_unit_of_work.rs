//! PostgreSQL Unit of Work 实现

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use trellis_errors::{AppError, AppResult};

use super::tx_repositories::{
    SharedTx, TxMenuRepository, TxMenuResourceRepository, TxRoleMenuRepository,
};
use crate::domain::menu::{MenuRepository, MenuResourceRepository, RoleMenuRepository};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

/// Postgres Unit of Work 工厂
pub struct PostgresUnitOfWorkFactory {
    pool: PgPool,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

/// Postgres Unit of Work 实现
///
/// 提交或回滚后事务被消费；未结束即丢弃时，
/// 底层连接归还池中自动回滚。
pub struct PostgresUnitOfWork {
    tx: SharedTx,
    menu_repo: TxMenuRepository,
    menu_resource_repo: TxMenuResourceRepository,
    role_menu_repo: TxRoleMenuRepository,
}

impl PostgresUnitOfWork {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        let tx = Arc::new(Mutex::new(Some(tx)));

        Self {
            tx: tx.clone(),
            menu_repo: TxMenuRepository::new(tx.clone()),
            menu_resource_repo: TxMenuResourceRepository::new(tx.clone()),
            role_menu_repo: TxRoleMenuRepository::new(tx),
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn menus(&self) -> &dyn MenuRepository {
        &self.menu_repo
    }

    fn menu_resources(&self) -> &dyn MenuResourceRepository {
        &self.menu_resource_repo
    }

    fn role_menus(&self) -> &dyn RoleMenuRepository {
        &self.role_menu_repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to rollback transaction: {}", e)))?;

        Ok(())
    }
}
