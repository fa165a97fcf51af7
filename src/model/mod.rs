//! 文档模式定义系统模块
//!
//! 声明式注册文档模式，提供可内省的字段句柄、字段类型转换与动态字段解析

pub mod attribute;
pub mod convenience;
pub mod field;
pub mod field_types;
pub mod macros;
pub mod pattern;
pub mod registry;
pub mod schema;

pub use attribute::AttributedField;
pub use convenience::*;
pub use field::{Field, FieldDescriptor};
pub use field_types::{FieldType, NumericBounds, SchemaRef, parse_date};
pub use pattern::GlobPattern;
pub use registry::{DynamicDefault, OrderedFields};
pub use schema::{
    dynamic_document_schema, mapping_fields, DocumentSchema, DocumentType, DynamicDocument, SchemaBuilder,
    SchemaKind,
};
