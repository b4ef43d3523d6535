//! 变更信号发布
//!
//! 菜单结构或状态提交后，向缓存信号通道写入时间戳，
//! 由外部策略引擎轮询该键并重建权限数据。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use trellis_ports::Cacher;

/// 变更信号发布器
///
/// best-effort 语义：只保证提交成功后尝试发布一次，
/// 发布失败记录告警，不影响已提交的变更。
pub struct ChangeSignal {
    cache: Arc<dyn Cacher>,
    namespace: String,
    key: String,
}

impl ChangeSignal {
    pub fn new(cache: Arc<dyn Cacher>, namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            cache,
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// 发布权限数据已变更信号，值为当前 Unix 时间戳（覆盖写）
    pub async fn publish_changed(&self) {
        let stamp = Utc::now().timestamp().to_string();
        match self.cache.set(&self.namespace, &self.key, &stamp).await {
            Ok(()) => {
                metrics::counter!("menu_sync_published_total").increment(1);
                debug!(
                    namespace = %self.namespace,
                    key = %self.key,
                    stamp,
                    "Published menu change signal"
                );
            }
            Err(e) => {
                warn!(error = %e, "Failed to publish menu change signal");
            }
        }
    }
}
