//! # 映射配置构建器模块
//!
//! 提供映射配置的构建器实现，支持链式调用和严格验证

use crate::config::core::{ConflictPolicy, MapperConfig};
use crate::error::EsDocError;
use rat_logger::info;

/// 映射配置构建器
///
/// 所有配置项必须显式设置
#[derive(Debug)]
pub struct MapperConfigBuilder {
    wire_name_conflict: Option<ConflictPolicy>,
    date_formats: Option<Vec<String>>,
    epoch_millis_dates: Option<bool>,
}

impl MapperConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            wire_name_conflict: None,
            date_formats: None,
            epoch_millis_dates: None,
        }
    }

    /// 设置线上字段名冲突处理策略
    ///
    /// # 参数
    ///
    /// * `policy` - 冲突处理策略
    pub fn wire_name_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.wire_name_conflict = Some(policy);
        self
    }

    /// 设置日期解析格式
    ///
    /// # 参数
    ///
    /// * `formats` - chrono 格式串列表，按顺序尝试
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// 设置是否接受毫秒时间戳
    pub fn epoch_millis_dates(mut self, enabled: bool) -> Self {
        self.epoch_millis_dates = Some(enabled);
        self
    }

    /// 构建映射配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置或校验失败，将返回错误
    pub fn build(self) -> Result<MapperConfig, EsDocError> {
        let wire_name_conflict = self.wire_name_conflict.ok_or_else(|| {
            crate::es_error!(config, "线上字段名冲突策略必须设置")
        })?;

        let date_formats = self.date_formats.ok_or_else(|| {
            crate::es_error!(config, "日期解析格式必须设置")
        })?;

        let epoch_millis_dates = self.epoch_millis_dates.ok_or_else(|| {
            crate::es_error!(config, "毫秒时间戳选项必须设置")
        })?;

        let config = MapperConfig {
            wire_name_conflict,
            date_formats,
            epoch_millis_dates,
        };
        config.validate()?;

        info!(
            "创建映射配置: 冲突策略={:?}, 日期格式数={}, 毫秒时间戳={}",
            config.wire_name_conflict,
            config.date_formats.len(),
            config.epoch_millis_dates
        );

        Ok(config)
    }
}

impl Default for MapperConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
