//! 菜单应用服务
//!
//! 树形菜单及其资源绑定的查询、维护与声明式导入。
//! 所有结构写入走 Unit of Work；更新与删除提交后发布变更信号。

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{info, warn};
use trellis_common::replace_path_prefix;
use trellis_errors::{AppError, AppResult};

use super::commands::{CreateMenuCommand, UpdateMenuCommand};
use super::import::{decode_import_file, MenuImportNode};
use super::queries::MenuQueryParams;
use crate::domain::menu::{
    build_menu_tree, collect_ancestor_ids, sort_menus, Menu, MenuFilter, MenuRepository,
    MenuResource, MenuResourceRepository,
};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::infrastructure::sync::ChangeSignal;

/// 菜单应用服务
///
/// 无进程内状态，可在多实例间并发使用
pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
    menu_resources: Arc<dyn MenuResourceRepository>,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    signal: Arc<ChangeSignal>,
    deny_delete: bool,
}

impl MenuService {
    pub fn new(
        menus: Arc<dyn MenuRepository>,
        menu_resources: Arc<dyn MenuResourceRepository>,
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        signal: Arc<ChangeSignal>,
        deny_delete: bool,
    ) -> Self {
        Self {
            menus,
            menu_resources,
            uow_factory,
            signal,
            deny_delete,
        }
    }

    /// 从声明式文件引导菜单数据
    ///
    /// 文件缺失视为无需导入；内容按扩展名解码后整体导入
    pub async fn init_from_file(&self, file: &str) -> AppResult<()> {
        let content = match tokio::fs::read_to_string(file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(file, "Menu data file not found, skip init menu data");
                return Ok(());
            }
            Err(e) => {
                return Err(AppError::internal(format!(
                    "Failed to read menu file '{}': {}",
                    file, e
                )));
            }
        };

        let items = decode_import_file(file, &content)?;
        self.bulk_import(items).await
    }

    /// 批量导入声明式菜单森林（单事务，幂等）
    ///
    /// 既有节点按 ID、同级代码、同级名称的优先级匹配并复用；
    /// 任何一步失败则整体回滚，不留下部分导入。
    pub async fn bulk_import(&self, items: Vec<MenuImportNode>) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;
        let created = Self::import_level(uow.as_ref(), &items, 0, "").await?;
        uow.commit().await?;

        if created > 0 {
            metrics::counter!("menu_import_nodes_total").increment(created);
        }
        info!(roots = items.len(), created, "Menu import finished");
        Ok(())
    }

    /// 导入一层兄弟节点并递归其子节点
    fn import_level<'a>(
        uow: &'a dyn UnitOfWork,
        items: &'a [MenuImportNode],
        parent_id: i64,
        parent_path: &'a str,
    ) -> BoxFuture<'a, AppResult<u64>> {
        Box::pin(async move {
            let mut created: u64 = 0;
            let total = items.len();

            for (position, item) in items.iter().enumerate() {
                let menu = match Self::resolve_declared(uow, item, parent_id).await? {
                    Some(existing) => existing,
                    None => {
                        let mut menu = Menu::new(
                            parent_id,
                            item.code.clone(),
                            item.name.clone(),
                            item.status.unwrap_or_default(),
                            item.sequence,
                        );
                        menu.id = item.id;
                        menu.parent_path = parent_path.to_string();
                        if menu.sequence == 0 {
                            // 先声明的兄弟节点权重更高
                            menu.sequence = (total - position) as i32;
                        }
                        menu.id = uow.menus().create(&menu).await?;
                        created += 1;
                        menu
                    }
                };

                for declared in &item.resources {
                    if declared.id > 0 && uow.menu_resources().exists_by_id(declared.id).await? {
                        continue;
                    }
                    if !declared.path.is_empty()
                        && uow
                            .menu_resources()
                            .exists_method_path_in_menu(&declared.method, &declared.path, menu.id)
                            .await?
                    {
                        continue;
                    }
                    let resource = MenuResource {
                        id: declared.id,
                        menu_id: menu.id,
                        method: declared.method.clone(),
                        path: declared.path.clone(),
                        created_at: chrono::Utc::now(),
                        updated_at: chrono::Utc::now(),
                    };
                    uow.menu_resources().create(&resource).await?;
                }

                if !item.children.is_empty() {
                    // 被复用的节点以库中路径为准，避免声明值过期时扩散
                    let child_prefix = menu.subtree_prefix();
                    created +=
                        Self::import_level(uow, &item.children, menu.id, &child_prefix).await?;
                }
            }

            Ok(created)
        })
    }

    /// 按 ID、同级代码、同级名称的优先级匹配既有节点
    async fn resolve_declared(
        uow: &dyn UnitOfWork,
        item: &MenuImportNode,
        parent_id: i64,
    ) -> AppResult<Option<Menu>> {
        if item.id > 0 {
            if uow.menus().exists_by_id(item.id).await? {
                return uow.menus().find_by_id(item.id).await;
            }
            return Ok(None);
        }
        if !item.code.is_empty() {
            return uow.menus().find_by_code_in_parent(&item.code, parent_id).await;
        }
        if !item.name.is_empty() {
            return uow.menus().find_by_name_in_parent(&item.name, parent_id).await;
        }
        Ok(None)
    }

    /// 过滤查询并装配为森林
    ///
    /// 名称子串与代码路径过滤会补全祖先（名称过滤再补全命中节点的子树），
    /// 结果始终是连通的树片段
    pub async fn query(&self, params: MenuQueryParams) -> AppResult<Vec<Menu>> {
        let mut filter = MenuFilter {
            name_contains: params.name_contains,
            status: params.status,
            code: None,
            parent_path_prefix: params.parent_path_prefix,
            ids: params.ids,
        };

        let code_path = params.code_path.filter(|p| !p.is_empty());
        if let Some(ref path) = code_path {
            let (code, prefix) = self.resolve_code_path(path).await?;
            filter.code = code;
            if prefix.is_some() {
                filter.parent_path_prefix = prefix;
            }
        }

        let mut data = self.menus.query(&filter).await?;

        let name_search = filter.name_contains.as_deref().is_some_and(|s| !s.is_empty());
        if name_search || code_path.is_some() {
            data = self.expand_to_connected_tree(data, name_search).await?;
            sort_menus(&mut data);
        }

        if params.include_resources {
            for menu in &mut data {
                menu.resources = self.menu_resources.list_by_menu(menu.id).await?;
            }
        }

        Ok(build_menu_tree(data))
    }

    /// 自上而下解析代码链，返回末段代码与祖先限定的子树前缀
    ///
    /// 末段之前任何一段未命中即 NotFound；全部分段为空时不构成过滤
    async fn resolve_code_path(
        &self,
        code_path: &str,
    ) -> AppResult<(Option<String>, Option<String>)> {
        let codes: Vec<&str> = code_path
            .split(['.', '/'])
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some((&last, ancestors)) = codes.split_last() else {
            return Ok((None, None));
        };

        let mut scope: Option<Menu> = None;
        for &code in ancestors {
            let parent_id = scope.as_ref().map_or(0, |menu| menu.id);
            let menu = self
                .menus
                .find_by_code_in_parent(code, parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Menu not found by code path '{}'", code_path))
                })?;
            scope = Some(menu);
        }

        Ok((
            Some(last.to_string()),
            scope.map(|menu| menu.subtree_prefix()),
        ))
    }

    /// 将命中集合补全为连通的树片段
    ///
    /// 祖先总是补全；`with_descendants` 时再拉入每个命中节点的整棵子树。
    /// 子树扫描只针对原始命中，按 ID 去重。
    async fn expand_to_connected_tree(
        &self,
        mut data: Vec<Menu>,
        with_descendants: bool,
    ) -> AppResult<Vec<Menu>> {
        if data.is_empty() {
            return Ok(data);
        }

        let mut seen: HashSet<i64> = data.iter().map(|menu| menu.id).collect();

        if with_descendants {
            let prefixes: Vec<String> = data.iter().map(Menu::subtree_prefix).collect();
            for prefix in prefixes {
                let descendants = self.menus.query(&MenuFilter::subtree(prefix)).await?;
                for menu in descendants {
                    if seen.insert(menu.id) {
                        data.push(menu);
                    }
                }
            }
        }

        let missing: Vec<i64> = collect_ancestor_ids(&data)
            .into_iter()
            .filter(|id| !seen.contains(id))
            .collect();
        if !missing.is_empty() {
            let ancestors = self.menus.query(&MenuFilter::by_ids(missing)).await?;
            for menu in ancestors {
                if seen.insert(menu.id) {
                    data.push(menu);
                }
            }
        }

        Ok(data)
    }

    /// 获取单个菜单及其资源绑定
    pub async fn get(&self, id: i64) -> AppResult<Menu> {
        let mut menu = self
            .menus
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Menu not found"))?;
        menu.resources = self.menu_resources.list_by_menu(menu.id).await?;
        Ok(menu)
    }

    /// 创建菜单及其资源绑定
    pub async fn create(&self, cmd: CreateMenuCommand) -> AppResult<Menu> {
        cmd.validate().map_err(AppError::validation)?;

        // 父节点必须存在，物化路径由父节点推导
        let mut parent_path = String::new();
        if cmd.parent_id > 0 {
            let parent = self
                .menus
                .find_by_id(cmd.parent_id)
                .await?
                .ok_or_else(|| AppError::not_found("Parent menu not found"))?;
            parent_path = parent.subtree_prefix();
        }

        self.ensure_unique_in_siblings(&cmd.code, &cmd.name, cmd.parent_id)
            .await?;

        let resources = cmd.resources.clone();
        let mut menu = cmd.into_menu();
        menu.parent_path = parent_path;

        let uow = self.uow_factory.begin().await?;
        menu.id = uow.menus().create(&menu).await?;
        for input in resources {
            let mut resource = input.into_resource(menu.id);
            resource.id = uow.menu_resources().create(&resource).await?;
            menu.resources.push(resource);
        }
        uow.commit().await?;

        Ok(menu)
    }

    /// 更新菜单；换父时级联改写后代路径，状态变化级联整棵子树
    ///
    /// 旧前缀与受影响后代在任何写入之前快照，改写只使用快照值
    pub async fn update(&self, id: i64, cmd: UpdateMenuCommand) -> AppResult<()> {
        cmd.validate().map_err(AppError::validation)?;

        let mut menu = self
            .menus
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Menu not found"))?;

        let old_status = menu.status;
        let old_prefix = menu.subtree_prefix();

        let mut descendants = Vec::new();
        if menu.parent_id != cmd.parent_id {
            if cmd.parent_id > 0 {
                let parent = self
                    .menus
                    .find_by_id(cmd.parent_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Parent menu not found"))?;
                menu.parent_path = parent.subtree_prefix();
            } else {
                menu.parent_path = String::new();
            }
            descendants = self
                .menus
                .query(&MenuFilter::subtree(old_prefix.clone()))
                .await?;
        }

        // 代码变化才重查同级唯一；代码置空时退回名称唯一
        if menu.code != cmd.code && !cmd.code.is_empty() {
            if self
                .menus
                .exists_code_in_parent(&cmd.code, cmd.parent_id)
                .await?
            {
                return Err(AppError::validation(
                    "Menu code already exists at the same level",
                ));
            }
        }
        if cmd.code.is_empty() && menu.name != cmd.name {
            if self
                .menus
                .exists_name_in_parent(&cmd.name, cmd.parent_id)
                .await?
            {
                return Err(AppError::validation(
                    "Menu name already exists at the same level",
                ));
            }
        }

        menu.parent_id = cmd.parent_id;
        menu.code = cmd.code;
        menu.name = cmd.name;
        menu.status = cmd.status;
        menu.sequence = cmd.sequence;
        menu.updated_at = chrono::Utc::now();

        let new_prefix = menu.subtree_prefix();

        let uow = self.uow_factory.begin().await?;

        // 状态级联在路径改写之前，此时后代仍挂在旧前缀下
        if old_status != menu.status {
            uow.menus()
                .update_status_by_path_prefix(&old_prefix, menu.status)
                .await?;
        }

        for child in &descendants {
            let rewritten = replace_path_prefix(&child.parent_path, &old_prefix, &new_prefix);
            uow.menus().update_parent_path(child.id, &rewritten).await?;
        }

        uow.menus().update(&menu).await?;

        // 资源绑定整组重建为命令声明的集合
        uow.menu_resources().delete_by_menu(id).await?;
        for input in cmd.resources {
            let resource = input.into_resource(id);
            uow.menu_resources().create(&resource).await?;
        }

        uow.commit().await?;
        self.signal.publish_changed().await;

        Ok(())
    }

    /// 删除菜单及其整棵子树，连带资源绑定与角色授权
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        // 全局禁删开关在任何读写之前生效
        if self.deny_delete {
            return Err(AppError::validation("Menu deletion is not allowed"));
        }

        let menu = self
            .menus
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Menu not found"))?;

        let descendants = self
            .menus
            .query(&MenuFilter::subtree(menu.subtree_prefix()))
            .await?;

        let uow = self.uow_factory.begin().await?;
        Self::delete_node(uow.as_ref(), id).await?;
        for child in &descendants {
            Self::delete_node(uow.as_ref(), child.id).await?;
        }
        uow.commit().await?;

        self.signal.publish_changed().await;
        Ok(())
    }

    async fn delete_node(uow: &dyn UnitOfWork, id: i64) -> AppResult<()> {
        uow.menus().delete(id).await?;
        uow.menu_resources().delete_by_menu(id).await?;
        uow.role_menus().delete_by_menu(id).await?;
        Ok(())
    }

    /// 同级唯一性：有代码查代码，无代码退回名称
    async fn ensure_unique_in_siblings(
        &self,
        code: &str,
        name: &str,
        parent_id: i64,
    ) -> AppResult<()> {
        if !code.is_empty() {
            if self.menus.exists_code_in_parent(code, parent_id).await? {
                return Err(AppError::validation(
                    "Menu code already exists at the same level",
                ));
            }
        } else if self.menus.exists_name_in_parent(name, parent_id).await? {
            return Err(AppError::validation(
                "Menu name already exists at the same level",
            ));
        }
        Ok(())
    }
}
