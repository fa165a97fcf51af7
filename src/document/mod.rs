//! 文档实例模块
//!
//! 一个文档实例对应模式的一条记录：属性名到原生值的映射，外加元字段、相关度评分
//! 以及可选的结果集上下文

pub mod hit;
pub mod instance;
pub mod serialization;

pub use instance::{LinkedInstance, ResultContext};

use crate::error::EsDocResult;
use crate::model::{AttributedField, DocumentSchema};
use crate::types::DataValue;
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;

/// `to_meta` 输出的元字段
pub const META_FIELD_NAMES: &[&str] = &["_id", "_index", "_type", "_routing", "_parent", "_timestamp", "_ttl"];

/// 文档实例
///
/// 没有内部同步，不要在线程间共享同一个实例
#[derive(Clone)]
pub struct Document {
    schema: Arc<DocumentSchema>,
    attributes: HashMap<String, DataValue>,
    result: Option<Arc<dyn ResultContext>>,
    instance: OnceCell<Option<LinkedInstance>>,
}

impl Document {
    /// 创建空文档
    pub fn new(schema: Arc<DocumentSchema>) -> Self {
        Self {
            schema,
            attributes: HashMap::new(),
            result: None,
            instance: OnceCell::new(),
        }
    }

    /// 关键字构造：值原样写入，不经过字段类型转换
    pub fn from_fields<I, K, V>(schema: Arc<DocumentSchema>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DataValue>,
    {
        let mut doc = Self::new(schema);
        for (key, value) in fields {
            doc.attributes.insert(key.into(), value.into());
        }
        doc
    }

    /// 关联结果集上下文（重置已缓存的关联对象）
    pub fn with_result(mut self, result: Arc<dyn ResultContext>) -> Self {
        self.result = Some(result);
        self.instance = OnceCell::new();
        self
    }

    /// 链式设置属性
    pub fn with<K: Into<String>, V: Into<DataValue>>(mut self, attr: K, value: V) -> Self {
        self.set(attr, value);
        self
    }

    pub fn schema(&self) -> &Arc<DocumentSchema> {
        &self.schema
    }

    /// 按属性名获取字段句柄
    pub fn field(&self, attr: &str) -> EsDocResult<Arc<AttributedField>> {
        self.schema.field(attr)
    }

    pub fn get(&self, attr: &str) -> Option<&DataValue> {
        self.attributes.get(attr)
    }

    /// 单值读取：列表属性取第一个元素
    pub fn get_single(&self, attr: &str) -> Option<&DataValue> {
        self.attributes.get(attr).and_then(DataValue::first)
    }

    pub fn set<K: Into<String>, V: Into<DataValue>>(&mut self, attr: K, value: V) {
        self.attributes.insert(attr.into(), value.into());
    }

    pub fn remove(&mut self, attr: &str) -> Option<DataValue> {
        self.attributes.remove(attr)
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.attributes.contains_key(attr)
    }

    /// 遍历已设置的属性（顺序不固定）
    pub fn attributes(&self) -> impl Iterator<Item = (&String, &DataValue)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    fn meta_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(DataValue::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.meta_str("_id")
    }

    pub fn index(&self) -> Option<&str> {
        self.meta_str("_index")
    }

    pub fn doc_type(&self) -> Option<&str> {
        self.meta_str("_type")
    }

    pub fn routing(&self) -> Option<&str> {
        self.meta_str("_routing")
    }

    pub fn parent(&self) -> Option<&str> {
        self.meta_str("_parent")
    }

    /// 相关度评分
    pub fn score(&self) -> Option<f64> {
        self.attributes.get("_score").and_then(DataValue::as_f64)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.attributes == other.attributes
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("schema", &self.schema.name())
            .field("attributes", &self.attributes)
            .field("has_result", &self.result.is_some())
            .finish()
    }
}
