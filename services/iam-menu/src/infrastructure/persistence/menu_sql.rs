//! 菜单表的行映射与查询语句
//!
//! 池仓储与事务仓储共享同一份 SQL，只在执行器上分流。

use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use sqlx::{Postgres, QueryBuilder};
use trellis_errors::AppResult;

use super::error_mapper::map_sqlx_error;
use crate::domain::menu::{Menu, MenuFilter, MenuResource, MenuStatus};

const MENU_COLUMNS: &str =
    "id, parent_id, parent_path, code, name, status, sequence, created_at, updated_at";

const RESOURCE_COLUMNS: &str = "id, menu_id, method, path, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: i64,
    parent_id: i64,
    parent_path: String,
    code: String,
    name: String,
    status: String,
    sequence: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MenuRow {
    fn into_menu(self) -> Menu {
        Menu {
            id: self.id,
            parent_id: self.parent_id,
            parent_path: self.parent_path,
            code: self.code,
            name: self.name,
            // 非法取值按启用处理，表约束保证正常路径不出现
            status: self.status.parse().unwrap_or_default(),
            sequence: self.sequence,
            created_at: self.created_at,
            updated_at: self.updated_at,
            resources: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct MenuResourceRow {
    id: i64,
    menu_id: i64,
    method: String,
    path: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MenuResourceRow {
    fn into_resource(self) -> MenuResource {
        MenuResource {
            id: self.id,
            menu_id: self.menu_id,
            method: self.method,
            path: self.path,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub(super) async fn exists_by_id(ex: impl PgExecutor<'_>, id: i64) -> AppResult<bool> {
    let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM menus WHERE id = $1)")
        .bind(id)
        .fetch_one(ex)
        .await
        .map_err(map_sqlx_error)?;
    Ok(result.0)
}

pub(super) async fn exists_code_in_parent(
    ex: impl PgExecutor<'_>,
    code: &str,
    parent_id: i64,
) -> AppResult<bool> {
    let result: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM menus WHERE code = $1 AND parent_id = $2)",
    )
    .bind(code)
    .bind(parent_id)
    .fetch_one(ex)
    .await
    .map_err(map_sqlx_error)?;
    Ok(result.0)
}

pub(super) async fn exists_name_in_parent(
    ex: impl PgExecutor<'_>,
    name: &str,
    parent_id: i64,
) -> AppResult<bool> {
    let result: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM menus WHERE name = $1 AND parent_id = $2)",
    )
    .bind(name)
    .bind(parent_id)
    .fetch_one(ex)
    .await
    .map_err(map_sqlx_error)?;
    Ok(result.0)
}

pub(super) async fn find_by_id(ex: impl PgExecutor<'_>, id: i64) -> AppResult<Option<Menu>> {
    let row = sqlx::query_as::<_, MenuRow>(&format!(
        "SELECT {} FROM menus WHERE id = $1",
        MENU_COLUMNS
    ))
    .bind(id)
    .fetch_optional(ex)
    .await
    .map_err(map_sqlx_error)?;
    Ok(row.map(MenuRow::into_menu))
}

pub(super) async fn find_by_code_in_parent(
    ex: impl PgExecutor<'_>,
    code: &str,
    parent_id: i64,
) -> AppResult<Option<Menu>> {
    let row = sqlx::query_as::<_, MenuRow>(&format!(
        "SELECT {} FROM menus WHERE code = $1 AND parent_id = $2 LIMIT 1",
        MENU_COLUMNS
    ))
    .bind(code)
    .bind(parent_id)
    .fetch_optional(ex)
    .await
    .map_err(map_sqlx_error)?;
    Ok(row.map(MenuRow::into_menu))
}

pub(super) async fn find_by_name_in_parent(
    ex: impl PgExecutor<'_>,
    name: &str,
    parent_id: i64,
) -> AppResult<Option<Menu>> {
    let row = sqlx::query_as::<_, MenuRow>(&format!(
        "SELECT {} FROM menus WHERE name = $1 AND parent_id = $2 LIMIT 1",
        MENU_COLUMNS
    ))
    .bind(name)
    .bind(parent_id)
    .fetch_optional(ex)
    .await
    .map_err(map_sqlx_error)?;
    Ok(row.map(MenuRow::into_menu))
}

/// 按过滤条件构造查询，排序固定为 (parent_path, sequence 降序, id)
fn build_menu_query(filter: &MenuFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM menus WHERE 1 = 1", MENU_COLUMNS));

    if let Some(name) = filter.name_contains.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND name LIKE ");
        builder.push_bind(format!("%{}%", name));
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(code) = filter.code.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND code = ");
        builder.push_bind(code.to_string());
    }
    if let Some(prefix) = filter.parent_path_prefix.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND parent_path LIKE ");
        builder.push_bind(format!("{}%", prefix));
    }
    if !filter.ids.is_empty() {
        builder.push(" AND id = ANY(");
        builder.push_bind(filter.ids.clone());
        builder.push(")");
    }

    builder.push(" ORDER BY parent_path ASC, sequence DESC, id ASC");
    builder
}

pub(super) async fn query_menus(
    ex: impl PgExecutor<'_>,
    filter: &MenuFilter,
) -> AppResult<Vec<Menu>> {
    let mut builder = build_menu_query(filter);
    let rows = builder
        .build_query_as::<MenuRow>()
        .fetch_all(ex)
        .await
        .map_err(map_sqlx_error)?;
    Ok(rows.into_iter().map(MenuRow::into_menu).collect())
}

pub(super) async fn create_menu(ex: impl PgExecutor<'_>, menu: &Menu) -> AppResult<i64> {
    if menu.id > 0 {
        // 声明式导入携带显式 ID
        sqlx::query(
            r#"
            INSERT INTO menus (id, parent_id, parent_path, code, name, status, sequence, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(menu.id)
        .bind(menu.parent_id)
        .bind(&menu.parent_path)
        .bind(&menu.code)
        .bind(&menu.name)
        .bind(menu.status.as_str())
        .bind(menu.sequence)
        .bind(menu.created_at)
        .bind(menu.updated_at)
        .execute(ex)
        .await
        .map_err(map_sqlx_error)?;
        Ok(menu.id)
    } else {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO menus (parent_id, parent_path, code, name, status, sequence, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(menu.parent_id)
        .bind(&menu.parent_path)
        .bind(&menu.code)
        .bind(&menu.name)
        .bind(menu.status.as_str())
        .bind(menu.sequence)
        .bind(menu.created_at)
        .bind(menu.updated_at)
        .fetch_one(ex)
        .await
        .map_err(map_sqlx_error)?;
        Ok(id)
    }
}

pub(super) async fn update_menu(ex: impl PgExecutor<'_>, menu: &Menu) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE menus
        SET parent_id = $2, parent_path = $3, code = $4, name = $5, status = $6, sequence = $7, updated_at = $8
        WHERE id = $1
        "#,
    )
    .bind(menu.id)
    .bind(menu.parent_id)
    .bind(&menu.parent_path)
    .bind(&menu.code)
    .bind(&menu.name)
    .bind(menu.status.as_str())
    .bind(menu.sequence)
    .bind(menu.updated_at)
    .execute(ex)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}

pub(super) async fn delete_menu(ex: impl PgExecutor<'_>, id: i64) -> AppResult<()> {
    sqlx::query("DELETE FROM menus WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

pub(super) async fn update_parent_path(
    ex: impl PgExecutor<'_>,
    id: i64,
    parent_path: &str,
) -> AppResult<()> {
    sqlx::query("UPDATE menus SET parent_path = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(parent_path)
        .bind(Utc::now())
        .execute(ex)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

pub(super) async fn update_status_by_path_prefix(
    ex: impl PgExecutor<'_>,
    prefix: &str,
    status: MenuStatus,
) -> AppResult<()> {
    sqlx::query("UPDATE menus SET status = $2, updated_at = $3 WHERE parent_path LIKE $1")
        .bind(format!("{}%", prefix))
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(ex)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

pub(super) async fn resource_exists_by_id(ex: impl PgExecutor<'_>, id: i64) -> AppResult<bool> {
    let result: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM menu_resources WHERE id = $1)")
            .bind(id)
            .fetch_one(ex)
            .await
            .map_err(map_sqlx_error)?;
    Ok(result.0)
}

pub(super) async fn resource_exists_method_path(
    ex: impl PgExecutor<'_>,
    method: &str,
    path: &str,
    menu_id: i64,
) -> AppResult<bool> {
    let result: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM menu_resources WHERE method = $1 AND path = $2 AND menu_id = $3)",
    )
    .bind(method)
    .bind(path)
    .bind(menu_id)
    .fetch_one(ex)
    .await
    .map_err(map_sqlx_error)?;
    Ok(result.0)
}

pub(super) async fn list_resources_by_menu(
    ex: impl PgExecutor<'_>,
    menu_id: i64,
) -> AppResult<Vec<MenuResource>> {
    let rows = sqlx::query_as::<_, MenuResourceRow>(&format!(
        "SELECT {} FROM menu_resources WHERE menu_id = $1 ORDER BY method ASC, path ASC, id ASC",
        RESOURCE_COLUMNS
    ))
    .bind(menu_id)
    .fetch_all(ex)
    .await
    .map_err(map_sqlx_error)?;
    Ok(rows.into_iter().map(MenuResourceRow::into_resource).collect())
}

pub(super) async fn create_resource(
    ex: impl PgExecutor<'_>,
    resource: &MenuResource,
) -> AppResult<i64> {
    if resource.id > 0 {
        sqlx::query(
            r#"
            INSERT INTO menu_resources (id, menu_id, method, path, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(resource.id)
        .bind(resource.menu_id)
        .bind(&resource.method)
        .bind(&resource.path)
        .bind(resource.created_at)
        .bind(resource.updated_at)
        .execute(ex)
        .await
        .map_err(map_sqlx_error)?;
        Ok(resource.id)
    } else {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO menu_resources (menu_id, method, path, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(resource.menu_id)
        .bind(&resource.method)
        .bind(&resource.path)
        .bind(resource.created_at)
        .bind(resource.updated_at)
        .fetch_one(ex)
        .await
        .map_err(map_sqlx_error)?;
        Ok(id)
    }
}

pub(super) async fn delete_resources_by_menu(
    ex: impl PgExecutor<'_>,
    menu_id: i64,
) -> AppResult<()> {
    sqlx::query("DELETE FROM menu_resources WHERE menu_id = $1")
        .bind(menu_id)
        .execute(ex)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

pub(super) async fn delete_role_menus_by_menu(
    ex: impl PgExecutor<'_>,
    menu_id: i64,
) -> AppResult<()> {
    sqlx::query("DELETE FROM role_menus WHERE menu_id = $1")
        .bind(menu_id)
        .execute(ex)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}
