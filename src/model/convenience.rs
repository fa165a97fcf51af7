//! 字段便捷函数模块
//!
//! 提供创建各种字段声明的便捷函数

use crate::model::field::Field;
use crate::model::field_types::FieldType;
use crate::model::schema::DocumentType;

/// 便捷函数：创建字符串字段
pub fn string_field() -> Field {
    Field::new(FieldType::String)
}

/// 便捷函数：创建整数字段
pub fn integer_field() -> Field {
    Field::new(FieldType::Integer)
}

/// 便捷函数：创建长整数字段
pub fn long_field() -> Field {
    Field::new(FieldType::Long)
}

/// 便捷函数：创建浮点数字段
pub fn float_field() -> Field {
    Field::new(FieldType::Float)
}

/// 便捷函数：创建双精度浮点数字段
pub fn double_field() -> Field {
    Field::new(FieldType::Double)
}

/// 便捷函数：创建布尔字段
pub fn boolean_field() -> Field {
    Field::new(FieldType::Boolean)
}

/// 便捷函数：创建日期字段
pub fn date_field() -> Field {
    Field::new(FieldType::Date)
}

/// 便捷函数：创建列表字段
pub fn list_field(item_type: FieldType) -> Field {
    Field::new(FieldType::list(item_type))
}

/// 便捷函数：创建对象字段
pub fn object_field<T: DocumentType>() -> Field {
    Field::new(FieldType::object::<T>())
}

/// 便捷函数：创建嵌套字段
pub fn nested_field<T: DocumentType>() -> Field {
    Field::new(FieldType::nested::<T>())
}

/// 便捷函数：创建动态字段（字段名为匹配模式）
pub fn dynamic_field(pattern: &str, field_type: FieldType) -> Field {
    Field::named(pattern, field_type)
}
