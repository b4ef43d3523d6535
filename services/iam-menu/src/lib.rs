//! IAM Menu Service
//!
//! 层级化菜单与资源授权管理：
//! - 菜单树以物化路径持久化，支持子树迁移与状态级联
//! - 菜单可绑定一组 API 资源（HTTP 方法 + 路径）
//! - 角色对菜单的授权在菜单删除时级联清除
//! - 结构变更提交后向缓存信号通道通知外部策略引擎

pub mod application;
pub mod domain;
pub mod infrastructure;
