//! 菜单领域模块

pub mod entity;
pub mod repository;
pub mod tree;

pub use entity::{Menu, MenuResource, MenuStatus, RoleMenu};
pub use repository::{MenuFilter, MenuRepository, MenuResourceRepository, RoleMenuRepository};
pub use tree::{build_menu_tree, collect_ancestor_ids, sort_menus};
