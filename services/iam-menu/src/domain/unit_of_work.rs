//! Unit of Work 模式
//!
//! 将一次结构变更的全部写入约束在同一个数据库事务里，
//! 子树级联与资源重建要么全部生效，要么全部回滚。

use async_trait::async_trait;
use trellis_errors::AppResult;

use crate::domain::menu::{MenuRepository, MenuResourceRepository, RoleMenuRepository};

/// Unit of Work trait
///
/// 暴露绑定到当前事务的仓储。commit/rollback 消费 self，
/// 事务只能结束一次；未提交即丢弃时由底层连接回滚。
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 菜单仓储
    fn menus(&self) -> &dyn MenuRepository;

    /// 菜单资源仓储
    fn menu_resources(&self) -> &dyn MenuResourceRepository;

    /// 角色-菜单关系仓储
    fn role_menus(&self) -> &dyn RoleMenuRepository;

    /// 提交事务
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
