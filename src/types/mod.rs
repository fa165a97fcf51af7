//! 通用数据类型定义
//!
//! 定义映射层在应用侧使用的原生数据值

pub mod data_value;

pub use data_value::DataValue;

/// 线上 JSON 对象类型
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
