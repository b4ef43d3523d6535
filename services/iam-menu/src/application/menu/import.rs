//! 声明式菜单导入格式

use std::path::Path;

use serde::{Deserialize, Serialize};
use trellis_errors::{AppError, AppResult};

use crate::domain::menu::MenuStatus;

/// 声明式菜单节点
///
/// 对应引导文件中的一条记录。`id` 与 `code` 可选，
/// 导入按 ID、同级代码、同级名称的优先级匹配既有节点。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuImportNode {
    pub id: i64,
    pub code: String,
    pub name: String,
    /// 缺省按启用处理
    pub status: Option<MenuStatus>,
    /// 0 表示按声明次序推导
    pub sequence: i32,
    pub resources: Vec<MenuResourceImport>,
    pub children: Vec<MenuImportNode>,
}

/// 声明式资源项
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuResourceImport {
    pub id: i64,
    pub method: String,
    pub path: String,
}

/// 按扩展名选择解码器，解析声明式菜单文件内容
pub fn decode_import_file(file: &str, content: &str) -> AppResult<Vec<MenuImportNode>> {
    let ext = Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ext {
        "json" => serde_json::from_str(content).map_err(|e| {
            AppError::validation(format!("Failed to decode JSON menu file '{}': {}", file, e))
        }),
        "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| {
            AppError::validation(format!("Failed to decode YAML menu file '{}': {}", file, e))
        }),
        other => Err(AppError::validation(format!(
            "Unsupported menu file type '{}'",
            other
        ))),
    }
}
