//! # 配置管理模块
//!
//! 提供映射层配置，支持构建器模式、文件加载与全局配置

pub mod builders;
pub mod core;
pub mod global;

pub use builders::MapperConfigBuilder;
pub use core::{ConflictPolicy, DEFAULT_DATE_FORMATS, MapperConfig};
pub use global::{global_config, reset_global_config, set_global_config};
