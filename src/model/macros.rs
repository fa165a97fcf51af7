//! 文档模式相关的宏定义
//!
//! 提供便捷的宏来定义文档类型

/// 便捷宏：定义文档类型
///
/// 生成一个实现 [`DocumentType`](crate::model::DocumentType) 的单元结构体，
/// 模式在首次调用 `schema()` 时注册且只注册一次；注册失败直接 panic
///
/// ```ignore
/// define_document! {
///     pub struct Product {
///         name: string_field(),
///         count: Field::named("cnt", FieldType::Integer),
///     }
///     doc_type = "product",
///     dynamic_fields = [Field::named("attr_*", FieldType::Integer)],
/// }
///
/// define_document! {
///     pub struct DiscountedProduct extends Product {
///         discount: float_field(),
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_document {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(extends $parent:ty)? {
            $(
                $attr:ident : $field:expr
            ),* $(,)?
        }
        $(
            doc_type = $doc_type:expr,
        )?
        $(
            dynamic = $dynamic:expr,
        )?
        $(
            dynamic_fields = [
                $( $dyn_field:expr ),* $(,)?
            ],
        )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::model::DocumentType for $name {
            fn schema() -> std::sync::Arc<$crate::model::DocumentSchema> {
                static SCHEMA: std::sync::OnceLock<std::sync::Arc<$crate::model::DocumentSchema>> =
                    std::sync::OnceLock::new();

                SCHEMA
                    .get_or_init(|| {
                        #[allow(unused_mut)]
                        let mut builder = $crate::model::DocumentSchema::builder(stringify!($name));
                        $(
                            builder = builder.extends(<$parent as $crate::model::DocumentType>::schema());
                        )?
                        $(
                            builder = builder.doc_type($doc_type);
                        )?
                        $(
                            if $dynamic {
                                builder = builder.dynamic();
                            }
                        )?
                        $(
                            builder = builder.field(stringify!($attr), $field);
                        )*
                        $(
                            $(
                                builder = builder.dynamic_field($dyn_field);
                            )*
                        )?

                        match builder.build() {
                            Ok(schema) => {
                                $crate::debug_log!("✅ 文档模式注册成功: {}", stringify!($name));
                                std::sync::Arc::new(schema)
                            }
                            Err(e) => panic!("❌ 文档模式注册失败: {}", e),
                        }
                    })
                    .clone()
            }
        }
    };
}
