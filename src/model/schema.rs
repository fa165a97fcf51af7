//! 文档模式注册模块
//!
//! 每个文档类型执行一次构建步骤，产出不可变的 [`DocumentSchema`]：
//! 全部字段、用户字段、元字段、动态字段四个注册表，以及线上字段名反向索引

use crate::config::{global_config, ConflictPolicy};
use crate::document::Document;
use crate::error::EsDocResult;
use crate::model::attribute::AttributedField;
use crate::model::field::{Field, FieldDescriptor};
use crate::model::field_types::FieldType;
use crate::model::pattern::GlobPattern;
use crate::model::registry::{DynamicDefault, OrderedFields};
use once_cell::sync::Lazy;
use rat_logger::{info, warn};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

/// 后端保留的元字段（按注册顺序）
pub fn mapping_fields() -> Vec<(&'static str, FieldType)> {
    vec![
        ("_uid", FieldType::String),
        ("_id", FieldType::String),
        ("_type", FieldType::String),
        ("_source", FieldType::String),
        ("_all", FieldType::String),
        ("_analyzer", FieldType::String),
        ("_parent", FieldType::String),
        ("_routing", FieldType::String),
        ("_index", FieldType::String),
        ("_size", FieldType::Integer),
        ("_timestamp", FieldType::Date),
        ("_ttl", FieldType::String),
        ("_score", FieldType::Float),
    ]
}

/// 模式种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// 只接受声明的字段（及显式声明的动态模式）
    Static,
    /// 任意名称都可解析为动态字段，源数据中的对象解码为嵌套动态文档
    Dynamic,
}

/// 用户字段声明（带声明顺序，用于继承时重新排序）
#[derive(Debug, Clone)]
struct Declaration {
    attr_name: String,
    field: Field,
    order: usize,
}

/// 文档类型特征
///
/// 通常由 [`define_document!`](crate::define_document) 生成实现
pub trait DocumentType {
    /// 获取（首次调用时注册）文档模式
    fn schema() -> Arc<DocumentSchema>;

    /// 按属性名获取字段句柄
    fn field(name: &str) -> EsDocResult<Arc<AttributedField>> {
        Self::schema().field(name)
    }

    /// 从命中载荷创建文档
    fn from_hit(hit: &JsonValue) -> EsDocResult<Document> {
        Document::from_hit(Self::schema(), hit)
    }

    /// 创建空文档
    fn new_document() -> Document {
        Document::new(Self::schema())
    }
}

/// 文档模式
#[derive(Debug)]
pub struct DocumentSchema {
    name: String,
    doc_type: Option<String>,
    kind: SchemaKind,
    fields: OrderedFields,
    user_fields: OrderedFields,
    mapping_fields: OrderedFields,
    dynamic_fields: OrderedFields,
    field_name_map: HashMap<String, Arc<AttributedField>>,
    declarations: Vec<Declaration>,
    dynamic_declarations: Vec<Field>,
    next_order: usize,
}

impl DocumentSchema {
    /// 创建模式构建器
    pub fn builder<S: Into<String>>(name: S) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 文档类型标记（写入 `to_meta` 的 `_type`）
    pub fn doc_type(&self) -> Option<&str> {
        self.doc_type.as_deref()
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == SchemaKind::Dynamic
    }

    /// 全部字段（元字段在前，随后是用户字段）
    pub fn fields(&self) -> &OrderedFields {
        &self.fields
    }

    pub fn user_fields(&self) -> &OrderedFields {
        &self.user_fields
    }

    pub fn mapping_fields(&self) -> &OrderedFields {
        &self.mapping_fields
    }

    /// 动态字段（按模式文本索引）
    pub fn dynamic_fields(&self) -> &OrderedFields {
        &self.dynamic_fields
    }

    /// 按属性名获取字段，未声明时按动态模式合成
    pub fn field(&self, name: &str) -> EsDocResult<Arc<AttributedField>> {
        self.fields.lookup(name)
    }

    /// 按线上字段名查找已声明字段
    pub fn field_by_wire_name(&self, wire_name: &str) -> Option<&Arc<AttributedField>> {
        self.field_name_map.get(wire_name)
    }

    /// 解析源数据中的键：只查线上字段名索引，不触发动态字段合成
    pub fn resolve_source_key(&self, key: &str) -> Option<Arc<AttributedField>> {
        self.field_name_map.get(key).cloned()
    }

    /// 属性名是否为已注册的元字段
    pub fn is_mapping_field(&self, attr_name: &str) -> bool {
        self.mapping_fields.contains(attr_name)
    }

    /// 构造临时的通配字段句柄（供查询构建器使用，不写入注册表）
    pub fn wildcard(&self, name: &str) -> AttributedField {
        AttributedField::new(
            &self.name,
            name,
            FieldDescriptor::new(name.to_string(), FieldType::Any, Vec::new(), self.next_order),
            true,
        )
    }
}

/// 模式构建器
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    doc_type: Option<String>,
    kind: Option<SchemaKind>,
    parent: Option<Arc<DocumentSchema>>,
    fields: Vec<(String, Field)>,
    dynamic_fields: Vec<Field>,
    conflict_policy: Option<ConflictPolicy>,
}

impl SchemaBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            doc_type: None,
            kind: None,
            parent: None,
            fields: Vec::new(),
            dynamic_fields: Vec::new(),
            conflict_policy: None,
        }
    }

    /// 设置文档类型标记
    pub fn doc_type<S: Into<String>>(mut self, doc_type: S) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// 设为动态模式
    pub fn dynamic(mut self) -> Self {
        self.kind = Some(SchemaKind::Dynamic);
        self
    }

    /// 继承父模式的字段、动态模式、种类与文档类型标记
    pub fn extends(mut self, parent: Arc<DocumentSchema>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// 声明用户字段，声明顺序即调用顺序
    pub fn field<S: Into<String>, F: Into<Field>>(mut self, attr_name: S, field: F) -> Self {
        self.fields.push((attr_name.into(), field.into()));
        self
    }

    /// 声明动态字段，字段名为匹配模式（例如 `attr_*`）
    pub fn dynamic_field(mut self, field: Field) -> Self {
        self.dynamic_fields.push(field);
        self
    }

    /// 覆盖全局配置中的线上字段名冲突策略
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = Some(policy);
        self
    }

    /// 执行注册步骤
    ///
    /// # 错误
    ///
    /// 属性名重复、线上字段名冲突（严格策略）或动态模式无效时返回模式配置错误
    pub fn build(self) -> EsDocResult<DocumentSchema> {
        let name = self.name;
        let policy = self
            .conflict_policy
            .unwrap_or_else(|| global_config().wire_name_conflict);

        if name.trim().is_empty() {
            return Err(crate::es_error!(schema, "<unnamed>", "模式名称不能为空"));
        }

        let parent = self.parent.as_deref();
        let kind = self
            .kind
            .or(parent.map(|p| p.kind))
            .unwrap_or(SchemaKind::Static);
        let doc_type = self.doc_type.or_else(|| parent.and_then(|p| p.doc_type.clone()));

        // 用户字段：继承的声明保留原顺序，自身声明排在其后；同名属性以派生模式为准
        let base_order = parent.map(|p| p.next_order).unwrap_or(0);
        let mut merged: Vec<Declaration> = parent.map(|p| p.declarations.clone()).unwrap_or_default();
        let mut own_names: Vec<&str> = Vec::new();
        for (i, (attr_name, field)) in self.fields.iter().enumerate() {
            if attr_name.is_empty() {
                return Err(crate::es_error!(schema, name, "属性名不能为空"));
            }
            if own_names.contains(&attr_name.as_str()) {
                return Err(crate::es_error!(schema, name, format!("属性 '{}' 重复声明", attr_name)));
            }
            if field.name() == Some("") {
                return Err(crate::es_error!(schema, name, format!("属性 '{}' 的线上字段名不能为空", attr_name)));
            }
            own_names.push(attr_name);

            merged.retain(|d| d.attr_name != *attr_name);
            merged.push(Declaration {
                attr_name: attr_name.clone(),
                field: field.clone(),
                order: base_order + i,
            });
        }
        merged.sort_by_key(|d| d.order);
        let next_order = base_order + self.fields.len();

        // 动态模式：继承的在前，同一模式以派生模式为准
        let mut dynamic_declarations: Vec<Field> = parent.map(|p| p.dynamic_declarations.clone()).unwrap_or_default();
        for field in &self.dynamic_fields {
            let pattern = field.name().ok_or_else(|| {
                crate::es_error!(schema, name, "动态字段必须指定匹配模式")
            })?;
            dynamic_declarations.retain(|d| d.name() != Some(pattern));
            dynamic_declarations.push(field.clone());
        }

        let mut defaults = Vec::new();
        let mut dynamic_fields = OrderedFields::new(&name);
        for (i, field) in dynamic_declarations.iter().enumerate() {
            let pattern_text = field.name().unwrap_or("*");
            let pattern = GlobPattern::new(pattern_text)?;
            let attr_field = Arc::new(AttributedField::new(
                &name,
                pattern_text,
                FieldDescriptor::from_declaration(pattern_text, field, next_order + i),
                true,
            ));
            dynamic_fields.insert(pattern_text, attr_field.clone());
            defaults.push(DynamicDefault::new(pattern, attr_field, false));
        }
        if kind == SchemaKind::Dynamic && !defaults.iter().any(|d| d.pattern().is_match_all()) {
            let template = Arc::new(AttributedField::new(
                &name,
                "*",
                FieldDescriptor::new("*".to_string(), FieldType::Any, Vec::new(), next_order + defaults.len()),
                true,
            ));
            defaults.push(DynamicDefault::new(GlobPattern::new("*")?, template, true));
        }

        let mut fields = OrderedFields::with_defaults(&name, defaults.clone());
        let mut user_fields = OrderedFields::with_defaults(&name, defaults);
        let mut mapping = OrderedFields::new(&name);
        let mut field_name_map: HashMap<String, Arc<AttributedField>> = HashMap::new();

        // 元字段：被用户字段按属性名或线上字段名覆盖时跳过
        for (meta_name, field_type) in mapping_fields() {
            let overridden = merged.iter().any(|d| {
                d.attr_name == meta_name || d.field.name() == Some(meta_name)
            });
            if overridden {
                continue;
            }
            let attr_field = Arc::new(AttributedField::new(
                &name,
                meta_name,
                FieldDescriptor::new(meta_name.to_string(), field_type, Vec::new(), 0),
                false,
            ));
            fields.insert(meta_name, attr_field.clone());
            mapping.insert(meta_name, attr_field.clone());
            field_name_map.insert(meta_name.to_string(), attr_field);
        }

        for declaration in &merged {
            let attr_field = Arc::new(AttributedField::new(
                &name,
                &declaration.attr_name,
                FieldDescriptor::from_declaration(&declaration.attr_name, &declaration.field, declaration.order),
                false,
            ));
            let wire_name = attr_field.wire_name().to_string();

            if let Some(existing) = field_name_map.get(&wire_name) {
                match policy {
                    ConflictPolicy::Error => {
                        return Err(crate::es_error!(
                            schema,
                            name,
                            format!(
                                "线上字段名 '{}' 同时被属性 '{}' 和 '{}' 使用",
                                wire_name,
                                existing.attr_name(),
                                declaration.attr_name
                            )
                        ));
                    }
                    ConflictPolicy::Overwrite => {
                        warn!(
                            "模式 {} 中线上字段名 '{}' 冲突，属性 '{}' 覆盖 '{}'",
                            name,
                            wire_name,
                            declaration.attr_name,
                            existing.attr_name()
                        );
                    }
                }
            }

            fields.insert(&declaration.attr_name, attr_field.clone());
            user_fields.insert(&declaration.attr_name, attr_field.clone());
            field_name_map.insert(wire_name, attr_field);
        }

        info!(
            "注册文档模式: {} (用户字段 {} 个, 元字段 {} 个, 动态模式 {} 个, 动态={})",
            name,
            user_fields.len(),
            mapping.len(),
            dynamic_fields.len(),
            kind == SchemaKind::Dynamic
        );

        Ok(DocumentSchema {
            name,
            doc_type,
            kind,
            fields,
            user_fields,
            mapping_fields: mapping,
            dynamic_fields,
            field_name_map,
            declarations: merged,
            dynamic_declarations,
            next_order,
        })
    }
}

static DYNAMIC_DOCUMENT_SCHEMA: Lazy<Arc<DocumentSchema>> = Lazy::new(|| {
    match SchemaBuilder::new("DynamicDocument").dynamic().build() {
        Ok(schema) => Arc::new(schema),
        Err(e) => panic!("❌ 文档模式注册失败: {}", e),
    }
});

/// 内置的基础动态模式，用于解码动态文档中的嵌套对象
pub fn dynamic_document_schema() -> Arc<DocumentSchema> {
    DYNAMIC_DOCUMENT_SCHEMA.clone()
}

/// 基础动态文档类型
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicDocument;

impl DocumentType for DynamicDocument {
    fn schema() -> Arc<DocumentSchema> {
        dynamic_document_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> DocumentSchema {
        DocumentSchema::builder("Product")
            .field("name", FieldType::String)
            .field("count", Field::named("cnt", FieldType::Integer))
            .build()
            .unwrap()
    }

    #[test]
    fn test_meta_fields_registered() {
        let schema = product();
        assert_eq!(schema.mapping_fields().len(), 13);
        assert!(schema.is_mapping_field("_id"));
        assert!(schema.is_mapping_field("_score"));
        assert_eq!(schema.mapping_fields().get("_timestamp").unwrap().field_type(), &FieldType::Date);
        assert_eq!(schema.user_fields().keys().collect::<Vec<_>>(), vec!["name", "count"]);
        assert_eq!(schema.fields().len(), 15);
    }

    #[test]
    fn test_wire_name_index() {
        let schema = product();
        assert_eq!(schema.field_by_wire_name("cnt").unwrap().attr_name(), "count");
        assert!(schema.field_by_wire_name("count").is_none());
        assert_eq!(schema.field("count").unwrap().wire_name(), "cnt");
    }

    #[test]
    fn test_unknown_attribute_fails_without_pattern() {
        let schema = product();
        let err = schema.field("price").unwrap_err();
        assert!(err.is_lookup_error());
    }

    #[test]
    fn test_wildcard_pattern_synthesizes() {
        let schema = DocumentSchema::builder("Product")
            .dynamic_field(Field::named("*", FieldType::String))
            .build()
            .unwrap();
        let field = schema.field("anything").unwrap();
        assert!(field.is_dynamic());
        assert_eq!(field.field_type(), &FieldType::String);
        assert_eq!(schema.dynamic_fields().keys().collect::<Vec<_>>(), vec!["*"]);
    }

    #[test]
    fn test_duplicate_wire_name_is_error() {
        let err = DocumentSchema::builder("Broken")
            .field("a", Field::named("x", FieldType::String))
            .field("b", Field::named("x", FieldType::Integer))
            .conflict_policy(ConflictPolicy::Error)
            .build()
            .unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_duplicate_wire_name_overwrite_policy() {
        let schema = DocumentSchema::builder("Lenient")
            .field("a", Field::named("x", FieldType::String))
            .field("b", Field::named("x", FieldType::Integer))
            .conflict_policy(ConflictPolicy::Overwrite)
            .build()
            .unwrap();
        assert_eq!(schema.field_by_wire_name("x").unwrap().attr_name(), "b");
        assert_eq!(schema.user_fields().len(), 2);
    }

    #[test]
    fn test_duplicate_attribute_is_error() {
        let err = DocumentSchema::builder("Broken")
            .field("a", FieldType::String)
            .field("a", FieldType::Integer)
            .build()
            .unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_dynamic_field_requires_pattern() {
        let err = DocumentSchema::builder("Broken")
            .dynamic_field(Field::new(FieldType::Integer))
            .build()
            .unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_meta_field_override() {
        let schema = DocumentSchema::builder("Custom")
            .field("_id", FieldType::Integer)
            .field("routing_key", Field::named("_routing", FieldType::String))
            .build()
            .unwrap();
        assert!(!schema.is_mapping_field("_id"));
        assert!(!schema.is_mapping_field("_routing"));
        assert_eq!(schema.field("_id").unwrap().field_type(), &FieldType::Integer);
        assert_eq!(schema.field_by_wire_name("_routing").unwrap().attr_name(), "routing_key");
        assert_eq!(schema.mapping_fields().len(), 11);
    }

    #[test]
    fn test_dynamic_document_schema() {
        let schema = dynamic_document_schema();
        assert!(schema.is_dynamic());
        assert!(schema.user_fields().is_empty());
        assert!(schema.field("whatever").unwrap().is_dynamic());
        assert!(schema.resolve_source_key("whatever").is_none());
    }

    #[test]
    fn test_wildcard_handle() {
        let schema = product();
        let handle = schema.wildcard("attr_*");
        assert!(handle.is_dynamic());
        assert_eq!(handle.wire_name(), "attr_*");
        assert_eq!(handle.schema_name(), "Product");
    }
}
