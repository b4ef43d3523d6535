//! 菜单命令定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::menu::{Menu, MenuResource, MenuStatus};

/// 资源绑定输入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuResourceInput {
    /// 既有绑定携带原 ID，0 表示新建
    #[serde(default)]
    pub id: i64,
    pub method: String,
    pub path: String,
    /// 整组重建时既有绑定保留原创建时间
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl MenuResourceInput {
    /// 转换为挂在指定菜单下的资源实体
    pub fn into_resource(self, menu_id: i64) -> MenuResource {
        let now = Utc::now();
        MenuResource {
            id: self.id,
            menu_id,
            method: self.method,
            path: self.path,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

/// 创建菜单命令
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMenuCommand {
    /// 父菜单 ID，0 表示创建根菜单
    #[serde(default)]
    pub parent_id: i64,
    #[serde(default)]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub status: MenuStatus,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub resources: Vec<MenuResourceInput>,
}

impl CreateMenuCommand {
    /// 验证命令
    pub fn validate(&self) -> Result<(), String> {
        validate_menu_fields(&self.code, &self.name, &self.resources)
    }

    /// 转换为菜单实体（不含资源）
    pub fn into_menu(self) -> Menu {
        Menu::new(self.parent_id, self.code, self.name, self.status, self.sequence)
    }
}

/// 更新菜单命令
///
/// 全量语义：字段覆盖现值，`resources` 为期望的完整绑定集合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMenuCommand {
    #[serde(default)]
    pub parent_id: i64,
    #[serde(default)]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub status: MenuStatus,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub resources: Vec<MenuResourceInput>,
}

impl UpdateMenuCommand {
    /// 验证命令
    pub fn validate(&self) -> Result<(), String> {
        validate_menu_fields(&self.code, &self.name, &self.resources)
    }
}

fn validate_menu_fields(
    code: &str,
    name: &str,
    resources: &[MenuResourceInput],
) -> Result<(), String> {
    if name.is_empty() {
        return Err("Menu name cannot be empty".to_string());
    }
    if name.len() > 200 {
        return Err("Menu name cannot exceed 200 characters".to_string());
    }
    if code.len() > 100 {
        return Err("Menu code cannot exceed 100 characters".to_string());
    }
    if !code.is_empty()
        && !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Menu code can only contain alphanumeric, underscore, and hyphen".to_string());
    }
    for resource in resources {
        if resource.method.is_empty() {
            return Err("Resource method cannot be empty".to_string());
        }
        if resource.path.is_empty() {
            return Err("Resource path cannot be empty".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateMenuCommand {
        CreateMenuCommand {
            parent_id: 0,
            code: "sys".to_string(),
            name: "System".to_string(),
            status: MenuStatus::Enabled,
            sequence: 0,
            resources: vec![MenuResourceInput {
                id: 0,
                method: "GET".to_string(),
                path: "/api/v1/users".to_string(),
                created_at: None,
            }],
        }
    }

    #[test]
    fn validate_accepts_well_formed_command() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let mut cmd = valid_create();
        cmd.name = String::new();
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn validate_accepts_empty_code() {
        let mut cmd = valid_create();
        cmd.code = String::new();
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn validate_rejects_code_with_invalid_chars() {
        let mut cmd = valid_create();
        cmd.code = "sys menu".to_string();
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_fields() {
        let mut cmd = valid_create();
        cmd.name = "x".repeat(201);
        assert!(cmd.validate().is_err());

        let mut cmd = valid_create();
        cmd.code = "a".repeat(101);
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn validate_rejects_resource_without_path() {
        let mut cmd = valid_create();
        cmd.resources[0].path = String::new();
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn resource_input_keeps_declared_created_at() {
        let stamp = "2026-01-02T03:04:05Z".parse().unwrap();
        let input = MenuResourceInput {
            id: 7,
            method: "POST".to_string(),
            path: "/api/v1/menus".to_string(),
            created_at: Some(stamp),
        };
        let resource = input.into_resource(42);
        assert_eq!(resource.menu_id, 42);
        assert_eq!(resource.id, 7);
        assert_eq!(resource.created_at, stamp);
        assert!(resource.updated_at > stamp);
    }
}
