//! 全局映射配置
//!
//! 模式注册与类型转换读取这里的配置；未设置时使用严格配置

use crate::config::core::MapperConfig;
use crate::error::EsDocResult;
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use rat_logger::info;
use std::sync::Arc;

static GLOBAL_CONFIG: Lazy<ArcSwap<MapperConfig>> =
    Lazy::new(|| ArcSwap::from_pointee(MapperConfig::strict()));

/// 设置全局映射配置
///
/// 只影响之后注册的模式和之后的转换调用
pub fn set_global_config(config: MapperConfig) -> EsDocResult<()> {
    config.validate()?;
    info!("更新全局映射配置: 冲突策略={:?}", config.wire_name_conflict);
    GLOBAL_CONFIG.store(Arc::new(config));
    Ok(())
}

/// 获取当前全局映射配置
pub fn global_config() -> Arc<MapperConfig> {
    GLOBAL_CONFIG.load_full()
}

/// 恢复为严格配置
pub fn reset_global_config() {
    GLOBAL_CONFIG.store(Arc::new(MapperConfig::strict()));
}
