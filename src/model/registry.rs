//! 有序字段注册表
//!
//! 按插入顺序保存属性名到绑定字段的映射；直接查找未命中时按通配模式合成动态字段，
//! 合成结果缓存在注册表中

use crate::error::EsDocResult;
use crate::model::attribute::AttributedField;
use crate::model::field::FieldDescriptor;
use crate::model::pattern::GlobPattern;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use crate::debug_log;

/// 动态字段默认工厂：模式 + 该模式声明的字段模板
#[derive(Debug, Clone)]
pub struct DynamicDefault {
    pattern: GlobPattern,
    template: Arc<AttributedField>,
    implicit: bool,
}

impl DynamicDefault {
    pub(crate) fn new(pattern: GlobPattern, template: Arc<AttributedField>, implicit: bool) -> Self {
        Self {
            pattern,
            template,
            implicit,
        }
    }

    pub fn pattern(&self) -> &GlobPattern {
        &self.pattern
    }

    pub fn template(&self) -> &Arc<AttributedField> {
        &self.template
    }

    /// 是否为动态模式自动追加的 `*`
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// 为具体名称合成字段，类型取自模板
    fn synthesize(&self, schema_name: &str, name: &str) -> AttributedField {
        let template = self.template.field();
        AttributedField::new(
            schema_name,
            name,
            FieldDescriptor::new(
                name.to_string(),
                template.field_type().clone(),
                template.fields().to_vec(),
                template.declaration_order(),
            ),
            true,
        )
    }
}

/// 有序字段注册表
#[derive(Debug)]
pub struct OrderedFields {
    schema_name: String,
    entries: Vec<Arc<AttributedField>>,
    index: HashMap<String, usize>,
    defaults: Vec<DynamicDefault>,
    synthesized: RwLock<HashMap<String, Arc<AttributedField>>>,
}

impl OrderedFields {
    pub fn new(schema_name: &str) -> Self {
        Self::with_defaults(schema_name, Vec::new())
    }

    pub fn with_defaults(schema_name: &str, defaults: Vec<DynamicDefault>) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            entries: Vec::new(),
            index: HashMap::new(),
            defaults,
            synthesized: RwLock::new(HashMap::new()),
        }
    }

    /// 插入字段；键已存在时原位替换，保持原来的顺序
    pub fn insert(&mut self, key: &str, field: Arc<AttributedField>) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos] = field,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(field);
            }
        }
    }

    /// 直接查找（不触发动态合成）
    pub fn get(&self, key: &str) -> Option<&Arc<AttributedField>> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// 两级查找：先查注册表，再按通配模式合成
    ///
    /// 都未命中时返回属性查找错误
    pub fn lookup(&self, key: &str) -> EsDocResult<Arc<AttributedField>> {
        if let Some(field) = self.get(key) {
            return Ok(field.clone());
        }
        self.resolve_dynamic(key)
            .ok_or_else(|| crate::es_error!(lookup, self.schema_name, key))
    }

    fn resolve_dynamic(&self, key: &str) -> Option<Arc<AttributedField>> {
        if let Some(field) = self.synthesized.read().get(key) {
            return Some(field.clone());
        }

        let default = self.defaults.iter().find(|d| d.pattern.matches(key))?;

        let mut synthesized = self.synthesized.write();
        let field = synthesized
            .entry(key.to_string())
            .or_insert_with(|| {
                debug_log!("合成动态字段: {}.{} (模式 '{}')", self.schema_name, key, default.pattern.as_str());
                Arc::new(default.synthesize(&self.schema_name, key))
            })
            .clone();
        Some(field)
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AttributedField>> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|f| f.attr_name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn defaults(&self) -> &[DynamicDefault] {
        &self.defaults
    }

    /// 已合成并缓存的动态字段数量
    pub fn synthesized_len(&self) -> usize {
        self.synthesized.read().len()
    }
}
