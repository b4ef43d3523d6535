//! trellis-adapter-sqlite - SQLite 适配器
//!
//! 缓存信号通道的嵌入式持久化后端

mod cache;
mod connection;

pub use cache::*;
pub use connection::*;
