//! 菜单应用模块

pub mod commands;
pub mod import;
pub mod queries;
pub mod service;

pub use commands::{CreateMenuCommand, MenuResourceInput, UpdateMenuCommand};
pub use import::{decode_import_file, MenuImportNode, MenuResourceImport};
pub use queries::MenuQueryParams;
pub use service::MenuService;
