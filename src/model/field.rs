//! 字段声明与字段描述符
//!
//! [`Field`] 是用户在模式中写下的声明；[`FieldDescriptor`] 是注册后不可变的描述，
//! 带有线上字段名和声明顺序

use crate::model::field_types::FieldType;

/// 字段声明
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: Option<String>,
    field_type: FieldType,
    fields: Vec<Field>,
}

impl Field {
    /// 创建字段声明，线上字段名默认取属性名
    pub fn new(field_type: FieldType) -> Self {
        Self {
            name: None,
            field_type,
            fields: Vec::new(),
        }
    }

    /// 创建指定线上字段名的字段声明
    pub fn named<S: Into<String>>(name: S, field_type: FieldType) -> Self {
        Self {
            name: Some(name.into()),
            field_type,
            fields: Vec::new(),
        }
    }

    /// 附加子字段（多字段映射，例如 `name.raw`）
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// 显式指定的线上字段名
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

impl From<FieldType> for Field {
    fn from(field_type: FieldType) -> Self {
        Field::new(field_type)
    }
}

/// 字段描述符（注册后不可变）
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    wire_name: String,
    field_type: FieldType,
    fields: Vec<Field>,
    declaration_order: usize,
}

impl FieldDescriptor {
    pub(crate) fn new(
        wire_name: String,
        field_type: FieldType,
        fields: Vec<Field>,
        declaration_order: usize,
    ) -> Self {
        Self {
            wire_name,
            field_type,
            fields,
            declaration_order,
        }
    }

    /// 由声明生成描述符，未指定线上字段名时使用属性名
    pub(crate) fn from_declaration(attr_name: &str, field: &Field, declaration_order: usize) -> Self {
        Self::new(
            field.name().unwrap_or(attr_name).to_string(),
            field.field_type().clone(),
            field.fields().to_vec(),
            declaration_order,
        )
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// 子字段声明
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// 按名称查找子字段
    pub fn sub_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == Some(name))
    }

    /// 声明顺序（注册阶段分配，继承的字段保留父模式中的顺序）
    pub fn declaration_order(&self) -> usize {
        self.declaration_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_name_defaults_to_attribute_name() {
        let descriptor = FieldDescriptor::from_declaration("title", &Field::new(FieldType::String), 3);
        assert_eq!(descriptor.wire_name(), "title");
        assert_eq!(descriptor.declaration_order(), 3);

        let descriptor = FieldDescriptor::from_declaration("title", &Field::named("name", FieldType::String), 0);
        assert_eq!(descriptor.wire_name(), "name");
    }

    #[test]
    fn test_sub_fields() {
        let field = Field::new(FieldType::String).with_fields(vec![Field::named("raw", FieldType::String)]);
        let descriptor = FieldDescriptor::from_declaration("name", &field, 0);
        assert!(descriptor.sub_field("raw").is_some());
        assert!(descriptor.sub_field("missing").is_none());
    }
}
