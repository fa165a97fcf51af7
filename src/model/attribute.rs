//! 绑定字段模块
//!
//! [`AttributedField`] 把字段描述符绑定到所属模式和代码中的属性名，
//! 供查询构建器读取线上字段名与类型

use crate::error::EsDocResult;
use crate::model::field::FieldDescriptor;
use crate::model::field_types::FieldType;
use crate::types::DataValue;
use serde_json::Value as JsonValue;

/// 绑定字段
///
/// `dynamic` 为 true 时表示由通配模式匹配或合成得到的字段
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedField {
    schema_name: String,
    attr_name: String,
    field: FieldDescriptor,
    dynamic: bool,
}

impl AttributedField {
    pub(crate) fn new(schema_name: &str, attr_name: &str, field: FieldDescriptor, dynamic: bool) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            attr_name: attr_name.to_string(),
            field,
            dynamic,
        }
    }

    /// 所属模式名称
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// 代码中使用的属性名
    pub fn attr_name(&self) -> &str {
        &self.attr_name
    }

    /// 线上字段名
    pub fn wire_name(&self) -> &str {
        self.field.wire_name()
    }

    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    pub fn field_type(&self) -> &FieldType {
        self.field.field_type()
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn to_native(&self, value: &JsonValue) -> EsDocResult<DataValue> {
        self.field.field_type().to_native(value)
    }

    pub fn to_native_single(&self, value: &JsonValue) -> EsDocResult<DataValue> {
        self.field.field_type().to_native_single(value)
    }

    pub fn from_native(&self, value: &DataValue) -> EsDocResult<JsonValue> {
        self.field.field_type().from_native(value)
    }

    /// 子字段句柄，线上字段名以点号连接（`comments.author`、`name.raw`）
    ///
    /// 依次查找：声明的子字段、嵌套模式中的字段；动态字段下未知名称合成无类型字段
    pub fn sub_field(&self, name: &str) -> EsDocResult<AttributedField> {
        let attr_name = format!("{}.{}", self.attr_name, name);

        if let Some(sub) = self.field.sub_field(name) {
            let wire_name = format!("{}.{}", self.wire_name(), sub.name().unwrap_or(name));
            return Ok(Self::new(
                &self.schema_name,
                &attr_name,
                FieldDescriptor::new(wire_name, sub.field_type().clone(), sub.fields().to_vec(), self.field.declaration_order()),
                self.dynamic,
            ));
        }

        if let Some(schema_ref) = self.field_type().doc_schema() {
            let schema = schema_ref.get();
            let child = schema.field(name).map_err(|_| crate::es_error!(lookup, self.schema_name, attr_name))?;
            let wire_name = format!("{}.{}", self.wire_name(), child.wire_name());
            return Ok(Self::new(
                &self.schema_name,
                &format!("{}.{}", self.attr_name, child.attr_name()),
                FieldDescriptor::new(
                    wire_name,
                    child.field_type().clone(),
                    child.field().fields().to_vec(),
                    self.field.declaration_order(),
                ),
                self.dynamic || child.is_dynamic(),
            ));
        }

        if self.dynamic && matches!(self.field_type(), FieldType::Any) {
            let wire_name = format!("{}.{}", self.wire_name(), name);
            return Ok(Self::new(
                &self.schema_name,
                &attr_name,
                FieldDescriptor::new(wire_name, FieldType::Any, Vec::new(), self.field.declaration_order()),
                true,
            ));
        }

        Err(crate::es_error!(lookup, self.schema_name, attr_name))
    }
}

impl std::fmt::Display for AttributedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema_name, self.attr_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::Field;
    use serde_json::json;

    fn attributed(attr: &str, field: Field, dynamic: bool) -> AttributedField {
        AttributedField::new("Product", attr, FieldDescriptor::from_declaration(attr, &field, 0), dynamic)
    }

    #[test]
    fn test_delegates_to_type() {
        let field = attributed("count", Field::new(FieldType::Integer), false);
        assert_eq!(field.to_native(&json!("3")).unwrap(), DataValue::Int(3));
        assert_eq!(field.from_native(&DataValue::Int(3)).unwrap(), json!(3));
        assert_eq!(field.wire_name(), "count");
        assert_eq!(field.to_string(), "Product.count");
    }

    #[test]
    fn test_multi_field_sub_field() {
        let field = attributed(
            "title",
            Field::named("name", FieldType::String).with_fields(vec![Field::named("raw", FieldType::String)]),
            false,
        );
        let raw = field.sub_field("raw").unwrap();
        assert_eq!(raw.wire_name(), "name.raw");
        assert_eq!(raw.attr_name(), "title.raw");

        let err = field.sub_field("missing").unwrap_err();
        assert!(err.is_lookup_error());
    }

    #[test]
    fn test_dynamic_any_sub_field() {
        let field = attributed("extra", Field::new(FieldType::Any), true);
        let sub = field.sub_field("color").unwrap();
        assert_eq!(sub.wire_name(), "extra.color");
        assert!(sub.is_dynamic());
    }
}
