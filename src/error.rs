//! 错误处理模块
//!
//! 定义字段映射与类型转换过程中的统一错误类型

use thiserror::Error;

/// 映射层错误类型
#[derive(Error, Debug)]
pub enum EsDocError {
    /// 模式配置错误（注册阶段发现，致命）
    #[error("模式配置错误: {schema} - {message}")]
    SchemaConfig {
        schema: String,
        message: String,
    },

    /// 属性查找失败（未声明且没有匹配的动态模式）
    #[error("属性查找失败: 模式 '{schema}' 中不存在属性 '{attribute}'")]
    AttributeLookup {
        schema: String,
        attribute: String,
    },

    /// 类型转换错误（线上值格式不正确）
    #[error("类型转换失败 ({type_name}): {message}")]
    Conversion {
        type_name: String,
        message: String,
    },

    /// 序列化错误
    #[error("数据序列化失败: {message}")]
    Serialization { message: String },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config { message: String },

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 映射层结果类型
pub type EsDocResult<T> = Result<T, EsDocError>;

impl From<serde_json::Error> for EsDocError {
    fn from(err: serde_json::Error) -> Self {
        EsDocError::Serialization {
            message: err.to_string(),
        }
    }
}

impl EsDocError {
    /// 是否为属性查找失败
    pub fn is_lookup_error(&self) -> bool {
        matches!(self, EsDocError::AttributeLookup { .. })
    }

    /// 是否为类型转换失败
    pub fn is_conversion_error(&self) -> bool {
        matches!(self, EsDocError::Conversion { .. })
    }

    /// 是否为模式配置错误
    pub fn is_schema_error(&self) -> bool {
        matches!(self, EsDocError::SchemaConfig { .. })
    }
}

/// 便捷宏：创建错误
#[macro_export]
macro_rules! es_error {
    (schema, $schema:expr, $message:expr) => {
        $crate::error::EsDocError::SchemaConfig {
            schema: $schema.to_string(),
            message: $message.to_string(),
        }
    };
    (lookup, $schema:expr, $attribute:expr) => {
        $crate::error::EsDocError::AttributeLookup {
            schema: $schema.to_string(),
            attribute: $attribute.to_string(),
        }
    };
    (conversion, $type_name:expr, $message:expr) => {
        $crate::error::EsDocError::Conversion {
            type_name: $type_name.to_string(),
            message: $message.to_string(),
        }
    };
    (serialization, $message:expr) => {
        $crate::error::EsDocError::Serialization {
            message: $message.to_string(),
        }
    };
    (config, $message:expr) => {
        $crate::error::EsDocError::Config {
            message: $message.to_string(),
        }
    };
}
