//! trellis-adapter-redis - Redis 适配器
//!
//! 缓存信号通道的远端共享后端

mod cache;
mod connection;

pub use cache::*;
pub use connection::*;
