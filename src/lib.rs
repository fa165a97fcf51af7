//! rat_esdoc - 搜索引擎文档映射库
//!
//! 声明式定义文档模式，按字段类型在线上 JSON 与原生值之间转换，
//! 支持模式继承、按通配模式合成的动态字段，以及把搜索命中解码为文档实例

// 导出所有公共模块
pub mod error;
pub mod types;
pub mod config;
pub mod model;
pub mod document;

// 重新导出常用类型和函数
pub use error::{EsDocError, EsDocResult};
pub use types::{DataValue, JsonMap};
pub use config::{
    ConflictPolicy, MapperConfig, MapperConfigBuilder, global_config, reset_global_config, set_global_config,
};
pub use model::{
    AttributedField, DocumentSchema, DocumentType, DynamicDocument, Field, FieldDescriptor, FieldType,
    GlobPattern, OrderedFields, SchemaBuilder, SchemaKind, SchemaRef, dynamic_document_schema,
    boolean_field, date_field, double_field, dynamic_field, float_field, integer_field, list_field,
    long_field, nested_field, object_field, string_field,
};
pub use document::{Document, LinkedInstance, ResultContext};

// 日志系统导入
use rat_logger::info;

// 供导出的宏在调用方 crate 中使用
#[doc(hidden)]
pub use rat_logger as __rat_logger;

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::__rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_esdoc库
///
/// 预先注册内置的基础动态模式
///
/// 注意：日志系统由调用者自行初始化，本库不会自动初始化日志
pub fn init() {
    let schema = dynamic_document_schema();
    info!("{} 初始化完成，基础动态模式: {}", get_info(), schema.name());
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
