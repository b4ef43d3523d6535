//! 基础设施层

pub mod persistence;
pub mod sync;

pub use persistence::{
    PgMenuRepository, PgMenuResourceRepository, PostgresUnitOfWork, PostgresUnitOfWorkFactory,
};
pub use sync::ChangeSignal;
