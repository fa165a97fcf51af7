//! 文档序列化
//!
//! 生成写入载荷：`to_meta` 输出非空元字段，`to_source` 输出经字段类型转换的源数据

use crate::document::{Document, META_FIELD_NAMES};
use crate::error::EsDocResult;
use crate::types::JsonMap;
use serde_json::Value as JsonValue;
use crate::debug_log;

impl Document {
    /// 元数据映射：非空的元字段，加上模式声明的文档类型标记
    pub fn to_meta(&self) -> JsonMap {
        let mut meta = JsonMap::new();
        if let Some(doc_type) = self.schema.doc_type() {
            meta.insert("_type".to_string(), JsonValue::String(doc_type.to_string()));
        }
        for name in META_FIELD_NAMES {
            if let Some(value) = self.attributes.get(*name) {
                if !value.is_empty() {
                    meta.insert(name.to_string(), value.to_json_value());
                }
            }
        }
        meta
    }

    /// 源数据映射（键为线上字段名）
    ///
    /// 跳过元字段与空值（null、空字符串、空列表）；没有对应字段（声明或动态）的属性不输出
    pub fn to_source(&self) -> EsDocResult<JsonMap> {
        let mut source = JsonMap::new();
        for (key, value) in &self.attributes {
            if self.schema.is_mapping_field(key) {
                continue;
            }
            if value.is_empty() {
                continue;
            }
            match self.schema.field(key) {
                Ok(attr_field) => {
                    source.insert(attr_field.wire_name().to_string(), attr_field.from_native(value)?);
                }
                Err(_) => {
                    debug_log!("模式 {} 中属性 '{}' 没有对应字段，跳过序列化", self.schema.name(), key);
                }
            }
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Document;
    use crate::model::{DocumentSchema, Field, FieldType};
    use crate::types::DataValue;
    use serde_json::json;
    use std::sync::Arc;

    fn schema() -> Arc<DocumentSchema> {
        Arc::new(
            DocumentSchema::builder("Item")
                .doc_type("item")
                .field("field", FieldType::String)
                .field("field2", FieldType::String)
                .field("field3", FieldType::list(FieldType::Integer))
                .field("field4", FieldType::Integer)
                .field("title", Field::named("name", FieldType::String))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_to_source_skips_empty_values() {
        let doc = Document::new(schema())
            .with("field", DataValue::Null)
            .with("field2", "")
            .with("field3", Vec::<i64>::new())
            .with("field4", 5);
        let source = doc.to_source().unwrap();
        assert_eq!(serde_json::Value::Object(source), json!({"field4": 5}));
    }

    #[test]
    fn test_to_source_uses_wire_names_and_skips_unknown() {
        let doc = Document::new(schema())
            .with("title", "Shoe")
            .with("_id", "1")
            .with("undeclared", "x");
        let source = doc.to_source().unwrap();
        assert_eq!(serde_json::Value::Object(source), json!({"name": "Shoe"}));
    }

    #[test]
    fn test_overridden_score_is_serialized() {
        let doc = Document::new(schema()).with("_score", 1.5).with("field4", 1);
        assert_eq!(serde_json::Value::Object(doc.to_source().unwrap()), json!({"field4": 1}));

        let ranked = Arc::new(
            DocumentSchema::builder("Ranked")
                .field("_score", FieldType::Double)
                .build()
                .unwrap(),
        );
        assert!(!ranked.is_mapping_field("_score"));
        let doc = Document::new(ranked).with("_score", 2.5);
        assert_eq!(serde_json::Value::Object(doc.to_source().unwrap()), json!({"_score": 2.5}));
    }

    #[test]
    fn test_to_meta() {
        let doc = Document::new(schema())
            .with("_id", "1")
            .with("_routing", "")
            .with("_index", "shop");
        let meta = doc.to_meta();
        assert_eq!(
            serde_json::Value::Object(meta),
            json!({"_type": "item", "_id": "1", "_index": "shop"})
        );
    }

    #[test]
    fn test_instance_type_overrides_schema_tag() {
        let doc = Document::new(schema()).with("_type", "special");
        assert_eq!(doc.to_meta().get("_type"), Some(&json!("special")));
    }
}
