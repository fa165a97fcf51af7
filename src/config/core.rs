//! # 配置管理模块 - 核心配置类型
//!
//! 控制模式注册与类型转换行为的配置项

use crate::error::{EsDocError, EsDocResult};
use serde::{Deserialize, Serialize};
use rat_logger::info;

/// 线上字段名冲突处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictPolicy {
    /// 冲突时报模式配置错误
    Error,
    /// 后声明的字段覆盖先声明的字段（记录警告）
    Overwrite,
}

/// 映射层配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// 线上字段名冲突处理策略
    pub wire_name_conflict: ConflictPolicy,
    /// Date 类型在 RFC3339 之外额外尝试的解析格式（chrono 格式串）
    pub date_formats: Vec<String>,
    /// Date 类型是否接受整数形式的毫秒时间戳
    pub epoch_millis_dates: bool,
}

/// 默认尝试的日期格式
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d",
];

impl MapperConfig {
    /// 创建配置构建器
    pub fn builder() -> super::builders::MapperConfigBuilder {
        super::builders::MapperConfigBuilder::new()
    }

    /// 严格配置：线上字段名冲突即报错
    pub fn strict() -> Self {
        Self {
            wire_name_conflict: ConflictPolicy::Error,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            epoch_millis_dates: true,
        }
    }

    /// 校验配置项
    pub fn validate(&self) -> EsDocResult<()> {
        if self.date_formats.is_empty() {
            return Err(crate::es_error!(config, "日期格式列表不能为空"));
        }
        if self.date_formats.iter().any(|f| f.trim().is_empty()) {
            return Err(crate::es_error!(config, "日期格式不能为空字符串"));
        }
        Ok(())
    }

    /// 从配置文件加载配置
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径，`.toml` 按 TOML 解析，其余按 JSON 解析
    pub fn from_file<P: AsRef<std::path::Path>>(config_path: P) -> EsDocResult<Self> {
        let content = std::fs::read_to_string(config_path.as_ref()).map_err(EsDocError::Io)?;

        let config: MapperConfig = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| crate::es_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::es_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };
        config.validate()?;

        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, config_path: P) -> EsDocResult<()> {
        let content = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| crate::es_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::es_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content).map_err(EsDocError::Io)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }
}
