//! 应用层模块

pub mod menu;

pub use menu::{
    CreateMenuCommand, MenuImportNode, MenuQueryParams, MenuResourceImport, MenuResourceInput,
    MenuService, UpdateMenuCommand,
};
