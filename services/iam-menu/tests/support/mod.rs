//! 菜单服务测试桩
//!
//! 内存仓储、快照式 Unit of Work 与内存缓存，
//! 让服务流程测试不依赖外部存储。

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use trellis_errors::{AppError, AppResult};
use trellis_ports::{CacheVisitor, Cacher};

use iam_menu::application::{CreateMenuCommand, MenuResourceInput, UpdateMenuCommand};
use iam_menu::domain::menu::{
    sort_menus, Menu, MenuFilter, MenuRepository, MenuResource, MenuResourceRepository, MenuStatus,
    RoleMenu, RoleMenuRepository,
};
use iam_menu::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use iam_menu::infrastructure::ChangeSignal;

/// 共享内存存储，池仓储与事务仓储都落在同一份数据上
pub struct MemoryStore {
    pub menus: Mutex<HashMap<i64, Menu>>,
    pub resources: Mutex<HashMap<i64, MenuResource>>,
    pub role_menus: Mutex<Vec<RoleMenu>>,
    next_menu_id: AtomicI64,
    next_resource_id: AtomicI64,
    /// 注入资源创建失败，用于验证回滚
    pub fail_resource_creates: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            menus: Mutex::new(HashMap::new()),
            resources: Mutex::new(HashMap::new()),
            role_menus: Mutex::new(Vec::new()),
            next_menu_id: AtomicI64::new(1),
            next_resource_id: AtomicI64::new(1),
            fail_resource_creates: AtomicBool::new(false),
        })
    }

    pub fn menu_count(&self) -> usize {
        self.menus.lock().unwrap().len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.lock().unwrap().len()
    }

    pub fn role_menu_count(&self) -> usize {
        self.role_menus.lock().unwrap().len()
    }

    pub fn menu_by_code(&self, code: &str) -> Option<Menu> {
        self.menus
            .lock()
            .unwrap()
            .values()
            .find(|m| m.code == code)
            .cloned()
    }

    /// 预置一条角色授权，角色管理流程在本服务之外
    pub fn seed_role_menu(&self, role_id: i64, menu_id: i64) {
        let mut rows = self.role_menus.lock().unwrap();
        let id = rows.len() as i64 + 1;
        let now = Utc::now();
        rows.push(RoleMenu {
            id,
            role_id,
            menu_id,
            created_at: now,
            updated_at: now,
        });
    }

    fn alloc_menu_id(&self, declared: i64) -> i64 {
        if declared > 0 {
            self.next_menu_id.fetch_max(declared + 1, Ordering::SeqCst);
            declared
        } else {
            self.next_menu_id.fetch_add(1, Ordering::SeqCst)
        }
    }

    fn alloc_resource_id(&self, declared: i64) -> i64 {
        if declared > 0 {
            self.next_resource_id.fetch_max(declared + 1, Ordering::SeqCst);
            declared
        } else {
            self.next_resource_id.fetch_add(1, Ordering::SeqCst)
        }
    }
}

fn matches_filter(menu: &Menu, filter: &MenuFilter) -> bool {
    if let Some(name) = filter.name_contains.as_deref().filter(|s| !s.is_empty()) {
        if !menu.name.contains(name) {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if menu.status != status {
            return false;
        }
    }
    if let Some(code) = filter.code.as_deref().filter(|s| !s.is_empty()) {
        if menu.code != code {
            return false;
        }
    }
    if let Some(prefix) = filter.parent_path_prefix.as_deref().filter(|s| !s.is_empty()) {
        if !menu.parent_path.starts_with(prefix) {
            return false;
        }
    }
    if !filter.ids.is_empty() && !filter.ids.contains(&menu.id) {
        return false;
    }
    true
}

pub struct MemoryMenuRepository {
    store: Arc<MemoryStore>,
}

impl MemoryMenuRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MenuRepository for MemoryMenuRepository {
    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        Ok(self.store.menus.lock().unwrap().contains_key(&id))
    }

    async fn exists_code_in_parent(&self, code: &str, parent_id: i64) -> AppResult<bool> {
        Ok(self
            .store
            .menus
            .lock()
            .unwrap()
            .values()
            .any(|m| m.parent_id == parent_id && m.code == code))
    }

    async fn exists_name_in_parent(&self, name: &str, parent_id: i64) -> AppResult<bool> {
        Ok(self
            .store
            .menus
            .lock()
            .unwrap()
            .values()
            .any(|m| m.parent_id == parent_id && m.name == name))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Menu>> {
        Ok(self.store.menus.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_code_in_parent(&self, code: &str, parent_id: i64) -> AppResult<Option<Menu>> {
        Ok(self
            .store
            .menus
            .lock()
            .unwrap()
            .values()
            .find(|m| m.parent_id == parent_id && m.code == code)
            .cloned())
    }

    async fn find_by_name_in_parent(&self, name: &str, parent_id: i64) -> AppResult<Option<Menu>> {
        Ok(self
            .store
            .menus
            .lock()
            .unwrap()
            .values()
            .find(|m| m.parent_id == parent_id && m.name == name)
            .cloned())
    }

    async fn query(&self, filter: &MenuFilter) -> AppResult<Vec<Menu>> {
        let mut result: Vec<Menu> = self
            .store
            .menus
            .lock()
            .unwrap()
            .values()
            .filter(|m| matches_filter(m, filter))
            .cloned()
            .collect();
        sort_menus(&mut result);
        Ok(result)
    }

    async fn create(&self, menu: &Menu) -> AppResult<i64> {
        let id = self.store.alloc_menu_id(menu.id);
        let mut menus = self.store.menus.lock().unwrap();
        if menus.contains_key(&id) {
            return Err(AppError::conflict("Duplicate menu id"));
        }
        let mut stored = menu.clone();
        stored.id = id;
        stored.resources = Vec::new();
        stored.children = Vec::new();
        menus.insert(id, stored);
        Ok(id)
    }

    async fn update(&self, menu: &Menu) -> AppResult<()> {
        let mut menus = self.store.menus.lock().unwrap();
        let mut stored = menu.clone();
        stored.resources = Vec::new();
        stored.children = Vec::new();
        menus.insert(menu.id, stored);
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.store.menus.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn update_parent_path(&self, id: i64, parent_path: &str) -> AppResult<()> {
        if let Some(menu) = self.store.menus.lock().unwrap().get_mut(&id) {
            menu.parent_path = parent_path.to_string();
            menu.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_status_by_path_prefix(&self, prefix: &str, status: MenuStatus) -> AppResult<()> {
        for menu in self.store.menus.lock().unwrap().values_mut() {
            if menu.parent_path.starts_with(prefix) {
                menu.status = status;
                menu.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

pub struct MemoryMenuResourceRepository {
    store: Arc<MemoryStore>,
}

impl MemoryMenuResourceRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MenuResourceRepository for MemoryMenuResourceRepository {
    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        Ok(self.store.resources.lock().unwrap().contains_key(&id))
    }

    async fn exists_method_path_in_menu(
        &self,
        method: &str,
        path: &str,
        menu_id: i64,
    ) -> AppResult<bool> {
        Ok(self
            .store
            .resources
            .lock()
            .unwrap()
            .values()
            .any(|r| r.menu_id == menu_id && r.method == method && r.path == path))
    }

    async fn list_by_menu(&self, menu_id: i64) -> AppResult<Vec<MenuResource>> {
        let mut result: Vec<MenuResource> = self
            .store
            .resources
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.menu_id == menu_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            a.method
                .cmp(&b.method)
                .then_with(|| a.path.cmp(&b.path))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(result)
    }

    async fn create(&self, resource: &MenuResource) -> AppResult<i64> {
        if self.store.fail_resource_creates.load(Ordering::SeqCst) {
            return Err(AppError::database("Resource storage unavailable"));
        }
        let id = self.store.alloc_resource_id(resource.id);
        let mut stored = resource.clone();
        stored.id = id;
        self.store.resources.lock().unwrap().insert(id, stored);
        Ok(id)
    }

    async fn delete_by_menu(&self, menu_id: i64) -> AppResult<()> {
        self.store
            .resources
            .lock()
            .unwrap()
            .retain(|_, r| r.menu_id != menu_id);
        Ok(())
    }
}

pub struct MemoryRoleMenuRepository {
    store: Arc<MemoryStore>,
}

impl MemoryRoleMenuRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleMenuRepository for MemoryRoleMenuRepository {
    async fn delete_by_menu(&self, menu_id: i64) -> AppResult<()> {
        self.store
            .role_menus
            .lock()
            .unwrap()
            .retain(|r| r.menu_id != menu_id);
        Ok(())
    }
}

struct StoreSnapshot {
    menus: HashMap<i64, Menu>,
    resources: HashMap<i64, MenuResource>,
    role_menus: Vec<RoleMenu>,
}

/// 快照式 Unit of Work
///
/// begin 时快照存储，commit 丢弃快照；
/// 未提交即丢弃时在 Drop 中恢复快照，模拟事务回滚。
pub struct MemoryUnitOfWork {
    store: Arc<MemoryStore>,
    snapshot: Option<StoreSnapshot>,
    menus: MemoryMenuRepository,
    resources: MemoryMenuResourceRepository,
    role_menus: MemoryRoleMenuRepository,
}

impl MemoryUnitOfWork {
    fn new(store: Arc<MemoryStore>) -> Self {
        let snapshot = StoreSnapshot {
            menus: store.menus.lock().unwrap().clone(),
            resources: store.resources.lock().unwrap().clone(),
            role_menus: store.role_menus.lock().unwrap().clone(),
        };
        Self {
            store: store.clone(),
            snapshot: Some(snapshot),
            menus: MemoryMenuRepository::new(store.clone()),
            resources: MemoryMenuResourceRepository::new(store.clone()),
            role_menus: MemoryRoleMenuRepository::new(store),
        }
    }
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.store.menus.lock().unwrap() = snapshot.menus;
            *self.store.resources.lock().unwrap() = snapshot.resources;
            *self.store.role_menus.lock().unwrap() = snapshot.role_menus;
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn menus(&self) -> &dyn MenuRepository {
        &self.menus
    }

    fn menu_resources(&self) -> &dyn MenuResourceRepository {
        &self.resources
    }

    fn role_menus(&self) -> &dyn RoleMenuRepository {
        &self.role_menus
    }

    async fn commit(mut self: Box<Self>) -> AppResult<()> {
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

pub struct MemoryUnitOfWorkFactory {
    store: Arc<MemoryStore>,
}

impl MemoryUnitOfWorkFactory {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UnitOfWorkFactory for MemoryUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork::new(self.store.clone())))
    }
}

/// 内存缓存，校验信号发布
#[derive(Default)]
pub struct MemoryCacher {
    entries: Mutex<BTreeMap<(String, String), String>>,
    pub fail_sets: AtomicBool,
}

#[async_trait]
impl Cacher for MemoryCacher {
    async fn set(&self, ns: &str, key: &str, value: &str) -> AppResult<()> {
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Cache backend unavailable"));
        }
        self.entries
            .lock()
            .unwrap()
            .insert((ns.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    async fn get(&self, ns: &str, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&(ns.to_string(), key.to_string()))
            .cloned())
    }

    async fn delete(&self, ns: &str, key: &str) -> AppResult<()> {
        self.entries
            .lock()
            .unwrap()
            .remove(&(ns.to_string(), key.to_string()));
        Ok(())
    }

    async fn exists(&self, ns: &str, key: &str) -> AppResult<bool> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .contains_key(&(ns.to_string(), key.to_string())))
    }

    async fn iterate(&self, ns: &str, visitor: &mut CacheVisitor<'_>) -> AppResult<()> {
        let entries = self.entries.lock().unwrap().clone();
        for ((n, k), v) in entries {
            if n == ns && !visitor(&k, &v) {
                break;
            }
        }
        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCacher>,
    pub service: iam_menu::application::MenuService,
}

pub fn setup() -> TestContext {
    setup_with_deny_delete(false)
}

pub fn setup_with_deny_delete(deny_delete: bool) -> TestContext {
    let store = MemoryStore::new();
    let cache = Arc::new(MemoryCacher::default());
    let signal = Arc::new(ChangeSignal::new(cache.clone(), "rbac", "last_change"));
    let service = iam_menu::application::MenuService::new(
        Arc::new(MemoryMenuRepository::new(store.clone())),
        Arc::new(MemoryMenuResourceRepository::new(store.clone())),
        Arc::new(MemoryUnitOfWorkFactory::new(store.clone())),
        signal,
        deny_delete,
    );
    TestContext {
        store,
        cache,
        service,
    }
}

pub fn create_cmd(parent_id: i64, code: &str, name: &str) -> CreateMenuCommand {
    CreateMenuCommand {
        parent_id,
        code: code.to_string(),
        name: name.to_string(),
        status: MenuStatus::Enabled,
        sequence: 0,
        resources: Vec::new(),
    }
}

pub fn resource_input(method: &str, path: &str) -> MenuResourceInput {
    MenuResourceInput {
        id: 0,
        method: method.to_string(),
        path: path.to_string(),
        created_at: None,
    }
}

/// 以当前实体状态构造更新命令，测试按需改动单个字段
pub fn update_cmd_from(menu: &Menu) -> UpdateMenuCommand {
    UpdateMenuCommand {
        parent_id: menu.parent_id,
        code: menu.code.clone(),
        name: menu.name.clone(),
        status: menu.status,
        sequence: menu.sequence,
        resources: menu
            .resources
            .iter()
            .map(|r| MenuResourceInput {
                id: r.id,
                method: r.method.clone(),
                path: r.path.clone(),
                created_at: Some(r.created_at),
            })
            .collect(),
    }
}
