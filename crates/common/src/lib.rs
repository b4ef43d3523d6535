//! trellis-common - 通用类型和工具库

pub mod retry;
pub mod treepath;

pub use retry::*;
pub use treepath::*;
