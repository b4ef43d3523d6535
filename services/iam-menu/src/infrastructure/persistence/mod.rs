//! 持久化层模块

pub mod error_mapper;
mod menu_sql;

pub mod menu_repositories;
pub mod menu_unit_of_work;
pub mod tx_repositories;

pub use menu_repositories::{PgMenuRepository, PgMenuResourceRepository};
pub use menu_unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory};
pub use tx_repositories::{
    SharedTx, TxMenuRepository, TxMenuResourceRepository, TxRoleMenuRepository,
};
