//! 菜单种子进程入口
//!
//! 连接存储并应用迁移，按配置从声明式文件引导菜单数据，
//! 供部署流水线在服务发布前执行。

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::info;

use iam_menu::application::MenuService;
use iam_menu::infrastructure::{
    ChangeSignal, PgMenuRepository, PgMenuResourceRepository, PostgresUnitOfWorkFactory,
};
use trellis_adapter_postgres::{create_pool, PostgresConfig};
use trellis_adapter_redis::{check_connection, create_connection_manager, RedisCache};
use trellis_adapter_sqlite::SqliteCache;
use trellis_common::{with_retry, RetryConfig};
use trellis_config::{AppConfig, CacheBackend};
use trellis_ports::Cacher;
use trellis_telemetry::{init_tracing, init_tracing_json};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config")?;
    if config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }
    info!(app = %config.app_name, env = %config.app_env, "Starting menu seeder");

    let retry = RetryConfig::default();
    let pg_config = PostgresConfig::new(config.database.url.expose_secret())
        .with_max_connections(config.database.max_connections);
    let pool = with_retry(&retry, "PostgreSQL connection", || {
        let pg_config = pg_config.clone();
        async move { create_pool(&pg_config).await }
    })
    .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    let cache: Arc<dyn Cacher> = match config.cache.backend {
        CacheBackend::Sqlite => {
            let url = format!("sqlite://{}", config.cache.sqlite_path);
            Arc::new(SqliteCache::connect(&url).await?)
        }
        CacheBackend::Redis => {
            let url = config
                .cache
                .redis_url
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("cache.redis_url is required for redis backend"))?;
            let mut conn = create_connection_manager(url.expose_secret()).await?;
            check_connection(&mut conn).await?;
            Arc::new(RedisCache::new(conn))
        }
    };

    let signal = Arc::new(ChangeSignal::new(
        cache.clone(),
        config.menu.sync_namespace.clone(),
        config.menu.sync_key.clone(),
    ));
    let service = MenuService::new(
        Arc::new(PgMenuRepository::new(pool.clone())),
        Arc::new(PgMenuResourceRepository::new(pool.clone())),
        Arc::new(PostgresUnitOfWorkFactory::new(pool.clone())),
        signal,
        config.menu.deny_delete,
    );

    if let Some(file) = &config.menu.import_file {
        service.init_from_file(file).await?;
    }

    cache.close().await?;
    pool.close().await;
    info!("Menu seeder finished");
    Ok(())
}
