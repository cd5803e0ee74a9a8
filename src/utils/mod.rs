//! 通用工具

pub mod format;
pub mod tree;
pub mod validate;
