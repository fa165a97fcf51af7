//! 命中载荷解码
//!
//! 把搜索引擎返回的单条命中转换为文档实例：先写元字段，再按线上字段名解码 `_source`

use crate::document::{Document, ResultContext};
use crate::error::EsDocResult;
use crate::model::{dynamic_document_schema, DocumentSchema};
use crate::types::{DataValue, JsonMap};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use crate::debug_log;

impl Document {
    /// 从命中载荷创建文档
    ///
    /// 载荷格式：`{"_score": .., "_id": .., ..., "_source": {线上字段名: 值}}`
    pub fn from_hit(schema: Arc<DocumentSchema>, hit: &JsonValue) -> EsDocResult<Self> {
        Self::materialize(schema, hit, None)
    }

    /// 从命中载荷创建文档，并关联结果集上下文
    pub fn from_hit_with_result(
        schema: Arc<DocumentSchema>,
        hit: &JsonValue,
        result: Arc<dyn ResultContext>,
    ) -> EsDocResult<Self> {
        Self::materialize(schema, hit, Some(result))
    }

    /// 只解码源数据（嵌套对象字段使用）
    pub fn from_source(schema: Arc<DocumentSchema>, source: &JsonMap) -> EsDocResult<Self> {
        let mut doc = Document::new(schema);
        doc.decode_source(source)?;
        Ok(doc)
    }

    fn materialize(
        schema: Arc<DocumentSchema>,
        hit: &JsonValue,
        result: Option<Arc<dyn ResultContext>>,
    ) -> EsDocResult<Self> {
        let hit = hit.as_object().ok_or_else(|| {
            crate::es_error!(conversion, "Hit", format!("命中载荷必须是对象，实际收到: {}", hit))
        })?;

        let mut doc = Document::new(schema.clone());
        doc.result = result;

        doc.attributes.insert(
            "_score".to_string(),
            hit.get("_score").cloned().map(DataValue::from_json_value).unwrap_or(DataValue::Null),
        );

        // 元字段（包括 _source）原样写入，缺失为 null
        for attr_field in schema.mapping_fields().iter() {
            let value = hit
                .get(attr_field.wire_name())
                .cloned()
                .map(DataValue::from_json_value)
                .unwrap_or(DataValue::Null);
            doc.attributes.insert(attr_field.attr_name().to_string(), value);
        }

        if let Some(JsonValue::Object(source)) = hit.get("_source") {
            doc.decode_source(source)?;
        }

        debug_log!(
            "解码命中: 模式={}, _id={:?}, 属性数={}",
            schema.name(),
            doc.id(),
            doc.attributes.len()
        );
        Ok(doc)
    }

    pub(crate) fn decode_source(&mut self, source: &JsonMap) -> EsDocResult<()> {
        for (key, value) in source {
            let (attr, native) = self.decode_source_entry(key, value)?;
            self.attributes.insert(attr, native);
        }
        Ok(())
    }

    fn decode_source_entry(&self, key: &str, value: &JsonValue) -> EsDocResult<(String, DataValue)> {
        let (attr, native) = match self.schema.resolve_source_key(key) {
            Some(attr_field) => (attr_field.attr_name().to_string(), attr_field.to_native(value)?),
            None => {
                debug_log!("模式 {} 未声明源字段 '{}'，原样保存", self.schema.name(), key);
                (key.to_string(), DataValue::from_json_value(value.clone()))
            }
        };

        if self.schema.is_dynamic() {
            if let DataValue::Object(map) = native {
                return Ok((attr, DataValue::Document(Box::new(Document::from_dynamic_object(map)))));
            }
        }
        Ok((attr, native))
    }

    /// 把原始映射包装为基础动态文档，嵌套映射递归包装
    fn from_dynamic_object(map: HashMap<String, DataValue>) -> Self {
        let mut doc = Document::new(dynamic_document_schema());
        for (key, value) in map {
            let value = match value {
                DataValue::Object(inner) => DataValue::Document(Box::new(Document::from_dynamic_object(inner))),
                other => other,
            };
            doc.attributes.insert(key, value);
        }
        doc
    }
}
