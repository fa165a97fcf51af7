//! 结果集关联对象
//!
//! 命中可以关联调用方提供的结果集上下文；首次访问时由上下文批量加载 `_id` 对应的对象，
//! 之后每个文档缓存自己的结果

use crate::document::Document;
use crate::error::EsDocResult;
use crate::model::DocumentSchema;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use crate::debug_log;

/// 关联对象（由调用方决定具体类型）
pub type LinkedInstance = Arc<dyn Any + Send + Sync>;

/// 结果集上下文
pub trait ResultContext: Send + Sync {
    /// 为某个模式的命中批量加载关联对象，返回 `_id` 到对象的映射
    fn populate_instances(&self, schema: &DocumentSchema) -> EsDocResult<HashMap<String, LinkedInstance>>;
}

impl Document {
    /// 是否关联了结果集上下文
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// 获取关联对象
    ///
    /// 没有上下文、没有 `_id` 或上下文中没有对应对象时返回 `None`。
    /// 成功的结果（包括 `None`）会被缓存，加载失败不缓存
    pub fn resolve_instance(&self) -> EsDocResult<Option<LinkedInstance>> {
        let cached = self.instance.get_or_try_init(|| -> EsDocResult<Option<LinkedInstance>> {
            let Some(result) = &self.result else {
                return Ok(None);
            };
            let instances = result.populate_instances(&self.schema)?;
            debug_log!(
                "加载关联对象: 模式={}, 数量={}, _id={:?}",
                self.schema.name(),
                instances.len(),
                self.id()
            );
            Ok(self.id().and_then(|id| instances.get(id).cloned()))
        })?;
        Ok(cached.clone())
    }

    /// 获取指定类型的关联对象，类型不符时返回 `None`
    pub fn resolve_instance_as<T: Any + Send + Sync>(&self) -> EsDocResult<Option<Arc<T>>> {
        Ok(self
            .resolve_instance()?
            .and_then(|instance| instance.downcast::<T>().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Row {
        title: String,
    }

    #[derive(Default)]
    struct CountingContext {
        calls: AtomicUsize,
    }

    impl ResultContext for CountingContext {
        fn populate_instances(&self, _schema: &DocumentSchema) -> EsDocResult<HashMap<String, LinkedInstance>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut map: HashMap<String, LinkedInstance> = HashMap::new();
            map.insert("1".to_string(), Arc::new(Row { title: "first".to_string() }));
            Ok(map)
        }
    }

    struct FailingContext;

    impl ResultContext for FailingContext {
        fn populate_instances(&self, _schema: &DocumentSchema) -> EsDocResult<HashMap<String, LinkedInstance>> {
            Err(crate::es_error!(conversion, "Row", "backend unavailable"))
        }
    }

    fn schema() -> Arc<DocumentSchema> {
        Arc::new(
            DocumentSchema::builder("Row")
                .field("title", FieldType::String)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_instance_loaded_once() {
        let context = Arc::new(CountingContext::default());
        let doc = Document::from_hit_with_result(schema(), &json!({"_id": "1", "_source": {}}), context.clone()).unwrap();

        let row = doc.resolve_instance_as::<Row>().unwrap().unwrap();
        assert_eq!(row.title, "first");
        assert!(doc.resolve_instance().unwrap().is_some());
        assert_eq!(context.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_id_resolves_none() {
        let context = Arc::new(CountingContext::default());
        let doc = Document::from_hit_with_result(schema(), &json!({"_id": "2"}), context.clone()).unwrap();
        assert!(doc.resolve_instance().unwrap().is_none());
        assert!(doc.resolve_instance().unwrap().is_none());
        assert_eq!(context.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_without_context() {
        let doc = Document::new(schema()).with("_id", "1");
        assert!(!doc.has_result());
        assert!(doc.resolve_instance().unwrap().is_none());
    }

    #[test]
    fn test_wrong_type_is_none() {
        let doc = Document::new(schema())
            .with("_id", "1")
            .with_result(Arc::new(CountingContext::default()));
        assert!(doc.resolve_instance_as::<String>().unwrap().is_none());
    }

    #[test]
    fn test_failure_not_cached() {
        let doc = Document::new(schema()).with("_id", "1").with_result(Arc::new(FailingContext));
        assert!(doc.resolve_instance().is_err());
        assert!(doc.resolve_instance().is_err());
    }
}
