//! 字段类型定义模块
//!
//! 每种字段类型负责线上 JSON 值与原生 [`DataValue`] 之间的双向转换

use crate::config::{global_config, MapperConfig};
use crate::document::Document;
use crate::error::EsDocResult;
use crate::model::schema::{DocumentSchema, DocumentType};
use crate::types::DataValue;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub const BYTE_MIN: i64 = -(1 << 7);
pub const BYTE_MAX: i64 = (1 << 7) - 1;
pub const SHORT_MIN: i64 = -(1 << 15);
pub const SHORT_MAX: i64 = (1 << 15) - 1;
pub const INTEGER_MIN: i64 = -(1 << 31);
pub const INTEGER_MAX: i64 = (1 << 31) - 1;
pub const LONG_MIN: i64 = i64::MIN;
pub const LONG_MAX: i64 = i64::MAX;

/// 数值类型的取值范围
///
/// 仅作为元数据提供给查询构建等下游组件，类型转换本身不做范围检查
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericBounds {
    Integer { min: i64, max: i64 },
    Float { min: f64, max: f64 },
}

/// 嵌套模式引用
///
/// `Lazy` 形式在首次使用时才解析，允许模式引用自身或尚未注册的模式
#[derive(Clone)]
pub enum SchemaRef {
    /// 已构建的模式
    Schema(Arc<DocumentSchema>),
    /// 延迟解析的模式
    Lazy(fn() -> Arc<DocumentSchema>),
}

impl SchemaRef {
    /// 引用某个已注册的文档类型
    pub fn of<T: DocumentType>() -> Self {
        SchemaRef::Lazy(T::schema)
    }

    /// 解析出模式
    pub fn get(&self) -> Arc<DocumentSchema> {
        match self {
            SchemaRef::Schema(schema) => schema.clone(),
            SchemaRef::Lazy(resolve) => resolve(),
        }
    }
}

impl From<Arc<DocumentSchema>> for SchemaRef {
    fn from(schema: Arc<DocumentSchema>) -> Self {
        SchemaRef::Schema(schema)
    }
}

impl std::fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaRef::Schema(schema) => write!(f, "SchemaRef({})", schema.name()),
            SchemaRef::Lazy(_) => write!(f, "SchemaRef(<lazy>)"),
        }
    }
}

impl PartialEq for SchemaRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SchemaRef::Schema(a), SchemaRef::Schema(b)) => Arc::ptr_eq(a, b) || a.name() == b.name(),
            (SchemaRef::Lazy(a), SchemaRef::Lazy(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => self.get().name() == other.get().name(),
        }
    }
}

/// 字段类型枚举
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// 无类型，原样透传
    Any,
    /// 字符串类型
    String,
    /// 8位整数
    Byte,
    /// 16位整数
    Short,
    /// 32位整数
    Integer,
    /// 64位整数
    Long,
    /// 单精度浮点数
    Float,
    /// 双精度浮点数
    Double,
    /// 日期时间类型
    Date,
    /// 布尔类型
    Boolean,
    /// 二进制类型（Base64 字符串，原样透传）
    Binary,
    /// IP 地址类型（原样透传）
    Ip,
    /// 对象类型
    Object(SchemaRef),
    /// 嵌套类型，转换行为与 Object 相同，仅查询语义不同
    Nested(SchemaRef),
    /// 列表类型
    List(Box<FieldType>),
}

impl FieldType {
    /// 对象类型字段
    pub fn object<T: DocumentType>() -> Self {
        FieldType::Object(SchemaRef::of::<T>())
    }

    /// 嵌套类型字段
    pub fn nested<T: DocumentType>() -> Self {
        FieldType::Nested(SchemaRef::of::<T>())
    }

    /// 列表类型字段
    pub fn list(sub_type: FieldType) -> Self {
        FieldType::List(Box::new(sub_type))
    }

    /// 获取类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Any => "Any",
            FieldType::String => "String",
            FieldType::Byte => "Byte",
            FieldType::Short => "Short",
            FieldType::Integer => "Integer",
            FieldType::Long => "Long",
            FieldType::Float => "Float",
            FieldType::Double => "Double",
            FieldType::Date => "Date",
            FieldType::Boolean => "Boolean",
            FieldType::Binary => "Binary",
            FieldType::Ip => "Ip",
            FieldType::Object(_) => "Object",
            FieldType::Nested(_) => "Nested",
            FieldType::List(_) => "List",
        }
    }

    /// 数值取值范围（非数值类型返回 None）
    pub fn bounds(&self) -> Option<NumericBounds> {
        match self {
            FieldType::Byte => Some(NumericBounds::Integer { min: BYTE_MIN, max: BYTE_MAX }),
            FieldType::Short => Some(NumericBounds::Integer { min: SHORT_MIN, max: SHORT_MAX }),
            FieldType::Integer => Some(NumericBounds::Integer { min: INTEGER_MIN, max: INTEGER_MAX }),
            FieldType::Long => Some(NumericBounds::Integer { min: LONG_MIN, max: LONG_MAX }),
            FieldType::Float => Some(NumericBounds::Float { min: f32::MIN as f64, max: f32::MAX as f64 }),
            FieldType::Double => Some(NumericBounds::Float { min: f64::MIN, max: f64::MAX }),
            _ => None,
        }
    }

    /// 嵌套文档模式（Object / Nested，以及元素为它们的 List）
    pub fn doc_schema(&self) -> Option<&SchemaRef> {
        match self {
            FieldType::Object(schema) | FieldType::Nested(schema) => Some(schema),
            FieldType::List(sub_type) => sub_type.doc_schema(),
            _ => None,
        }
    }

    /// 线上值 -> 原生值
    ///
    /// 对 null 总是返回 `DataValue::Null`；格式错误的线上值返回转换错误
    pub fn to_native(&self, value: &JsonValue) -> EsDocResult<DataValue> {
        if value.is_null() {
            return Ok(DataValue::Null);
        }

        match self {
            FieldType::Any | FieldType::Binary | FieldType::Ip => Ok(DataValue::from_json_value(value.clone())),
            FieldType::String => Ok(DataValue::String(match value {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })),
            FieldType::Byte | FieldType::Short | FieldType::Integer | FieldType::Long => self.coerce_integer(value),
            FieldType::Float | FieldType::Double => self.coerce_float(value),
            FieldType::Date => {
                let config = global_config();
                parse_date(value, &config).map(DataValue::DateTime)
            }
            FieldType::Boolean => Ok(DataValue::Bool(coerce_boolean(value))),
            FieldType::Object(schema) | FieldType::Nested(schema) => match value {
                JsonValue::Object(map) => {
                    let document = Document::from_source(schema.get(), map)?;
                    Ok(DataValue::Document(Box::new(document)))
                }
                other => Err(crate::es_error!(
                    conversion,
                    self.type_name(),
                    format!("期望对象类型，实际收到: {}", other)
                )),
            },
            FieldType::List(sub_type) => {
                let items = match value {
                    JsonValue::Array(arr) => arr
                        .iter()
                        .map(|v| sub_type.to_native(v))
                        .collect::<EsDocResult<Vec<_>>>()?,
                    single => vec![sub_type.to_native(single)?],
                };
                Ok(DataValue::Array(items))
            }
        }
    }

    /// 线上值 -> 单个原生值
    ///
    /// 列表类型返回第一个元素（空列表返回 null），其余类型与 `to_native` 相同
    pub fn to_native_single(&self, value: &JsonValue) -> EsDocResult<DataValue> {
        let native = self.to_native(value)?;
        match self {
            FieldType::List(_) => Ok(native.first().cloned().unwrap_or(DataValue::Null)),
            _ => Ok(native),
        }
    }

    /// 原生值 -> 线上值
    pub fn from_native(&self, value: &DataValue) -> EsDocResult<JsonValue> {
        if value.is_null() {
            return Ok(JsonValue::Null);
        }

        match self {
            FieldType::Object(_) | FieldType::Nested(_) => match value {
                DataValue::Document(doc) => Ok(JsonValue::Object(doc.to_source()?)),
                other => Ok(other.to_json_value()),
            },
            FieldType::List(sub_type) => {
                let items = match value {
                    DataValue::Array(arr) => arr
                        .iter()
                        .map(|v| sub_type.from_native(v))
                        .collect::<EsDocResult<Vec<_>>>()?,
                    single => vec![sub_type.from_native(single)?],
                };
                Ok(JsonValue::Array(items))
            }
            _ => Ok(value.to_json_value()),
        }
    }

    fn coerce_integer(&self, value: &JsonValue) -> EsDocResult<DataValue> {
        match value {
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(DataValue::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(DataValue::UInt(u))
                } else {
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                        Ok(DataValue::Int(f.trunc() as i64))
                    } else {
                        Err(crate::es_error!(conversion, self.type_name(), format!("数值超出整数范围: {}", n)))
                    }
                }
            }
            JsonValue::String(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    Ok(DataValue::Int(i))
                } else if let Ok(u) = trimmed.parse::<u64>() {
                    Ok(DataValue::UInt(u))
                } else {
                    Err(crate::es_error!(conversion, self.type_name(), format!("无法解析为整数: '{}'", s)))
                }
            }
            JsonValue::Bool(b) => Ok(DataValue::Int(i64::from(*b))),
            other => Err(crate::es_error!(
                conversion,
                self.type_name(),
                format!("无法将 {} 转换为整数", other)
            )),
        }
    }

    fn coerce_float(&self, value: &JsonValue) -> EsDocResult<DataValue> {
        match value {
            JsonValue::Number(n) => n
                .as_f64()
                .map(DataValue::Float)
                .ok_or_else(|| crate::es_error!(conversion, self.type_name(), format!("无效的数值: {}", n))),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map(DataValue::Float)
                .map_err(|_| crate::es_error!(conversion, self.type_name(), format!("无法解析为浮点数: '{}'", s))),
            JsonValue::Bool(b) => Ok(DataValue::Float(if *b { 1.0 } else { 0.0 })),
            other => Err(crate::es_error!(
                conversion,
                self.type_name(),
                format!("无法将 {} 转换为浮点数", other)
            )),
        }
    }
}

/// 布尔转换：false、0、"false"、"F" 为 false，其余为 true
fn coerce_boolean(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64() != Some(0.0),
        JsonValue::String(s) => !(s == "false" || s == "F"),
        _ => true,
    }
}

/// 解析日期值
///
/// 依次尝试 RFC3339、带时区偏移的格式、配置中的无时区格式（按 UTC 处理）；
/// 配置允许时整数按毫秒时间戳解析
pub fn parse_date(value: &JsonValue, config: &MapperConfig) -> EsDocResult<DateTime<FixedOffset>> {
    match value {
        JsonValue::String(s) => parse_date_str(s, config),
        JsonValue::Number(n) if config.epoch_millis_dates => {
            let millis = n
                .as_i64()
                .ok_or_else(|| crate::es_error!(conversion, "Date", format!("无效的毫秒时间戳: {}", n)))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| crate::es_error!(conversion, "Date", format!("毫秒时间戳超出范围: {}", millis)))
        }
        other => Err(crate::es_error!(conversion, "Date", format!("无法将 {} 解析为日期", other))),
    }
}

fn parse_date_str(s: &str, config: &MapperConfig) -> EsDocResult<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    for format in &config.date_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc().fixed_offset());
            }
        }
    }

    Err(crate::es_error!(conversion, "Date", format!("无法解析日期字符串: '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_none_is_total() {
        let types = vec![
            FieldType::Any,
            FieldType::String,
            FieldType::Integer,
            FieldType::Double,
            FieldType::Date,
            FieldType::Boolean,
            FieldType::Binary,
            FieldType::list(FieldType::Integer),
        ];
        for field_type in types {
            assert_eq!(field_type.to_native(&JsonValue::Null).unwrap(), DataValue::Null);
            assert_eq!(field_type.from_native(&DataValue::Null).unwrap(), JsonValue::Null);
        }
    }

    #[test]
    fn test_boolean_coercion() {
        let t = FieldType::Boolean;
        assert_eq!(t.to_native(&json!(false)).unwrap(), DataValue::Bool(false));
        assert_eq!(t.to_native(&json!(0)).unwrap(), DataValue::Bool(false));
        assert_eq!(t.to_native(&json!("false")).unwrap(), DataValue::Bool(false));
        assert_eq!(t.to_native(&json!("F")).unwrap(), DataValue::Bool(false));
        assert_eq!(t.to_native(&json!("true")).unwrap(), DataValue::Bool(true));
        assert_eq!(t.to_native(&json!(1)).unwrap(), DataValue::Bool(true));
        assert_eq!(t.to_native(&json!("0")).unwrap(), DataValue::Bool(true));
        assert_eq!(t.to_native(&JsonValue::Null).unwrap(), DataValue::Null);
    }

    #[test]
    fn test_list_of_integers() {
        let t = FieldType::list(FieldType::Integer);
        assert_eq!(t.to_native(&json!("5")).unwrap(), DataValue::from(vec![5]));
        assert_eq!(t.to_native(&json!(["1", "2"])).unwrap(), DataValue::from(vec![1, 2]));
        assert_eq!(t.to_native_single(&json!(["1", "2"])).unwrap(), DataValue::Int(1));
        assert_eq!(t.to_native_single(&json!([])).unwrap(), DataValue::Null);
        assert_eq!(t.from_native(&DataValue::Int(7)).unwrap(), json!([7]));
    }

    #[test]
    fn test_integer_coercion() {
        let t = FieldType::Integer;
        assert_eq!(t.to_native(&json!("3")).unwrap(), DataValue::Int(3));
        assert_eq!(t.to_native(&json!(" 42 ")).unwrap(), DataValue::Int(42));
        assert_eq!(t.to_native(&json!(3.9)).unwrap(), DataValue::Int(3));
        assert_eq!(t.to_native(&json!(true)).unwrap(), DataValue::Int(1));

        let err = t.to_native(&json!("3.5")).unwrap_err();
        assert!(err.is_conversion_error());
        assert!(t.to_native(&json!({"a": 1})).unwrap_err().is_conversion_error());
    }

    #[test]
    fn test_scalar_round_trip() {
        let cases = vec![
            (FieldType::String, json!("hello")),
            (FieldType::Integer, json!(12)),
            (FieldType::Long, json!(9_000_000_000i64)),
            (FieldType::Double, json!(2.5)),
            (FieldType::Boolean, json!(true)),
            (FieldType::Ip, json!("10.0.0.1")),
            (FieldType::Binary, json!("aGVsbG8=")),
        ];
        for (field_type, wire) in cases {
            let native = field_type.to_native(&wire).unwrap();
            assert_eq!(field_type.from_native(&native).unwrap(), wire, "{}", field_type.type_name());
        }
    }

    #[test]
    fn test_string_coercion_from_scalars() {
        let t = FieldType::String;
        assert_eq!(t.to_native(&json!(5)).unwrap(), DataValue::from("5"));
        assert_eq!(t.to_native(&json!(true)).unwrap(), DataValue::from("true"));
    }

    #[test]
    fn test_float_coercion() {
        let t = FieldType::Float;
        assert_eq!(t.to_native(&json!("1.25")).unwrap(), DataValue::Float(1.25));
        assert_eq!(t.to_native(&json!(2)).unwrap(), DataValue::Float(2.0));
        assert!(t.to_native(&json!("abc")).unwrap_err().is_conversion_error());
    }

    #[test]
    fn test_date_parsing() {
        let t = FieldType::Date;

        let value = t.to_native(&json!("2015-03-14T09:26:53+03:00")).unwrap();
        let dt = value.as_datetime().unwrap();
        assert_eq!(dt.year(), 2015);
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.offset().local_minus_utc(), 3 * 3600);

        let value = t.to_native(&json!("2015-03-14T09:26:53.589")).unwrap();
        assert_eq!(value.as_datetime().unwrap().second(), 53);

        let value = t.to_native(&json!("2015-03-14")).unwrap();
        let dt = value.as_datetime().unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (3, 14, 0));

        let value = t.to_native(&json!(0)).unwrap();
        assert_eq!(value.as_datetime().unwrap().year(), 1970);

        assert!(t.to_native(&json!("not a date")).unwrap_err().is_conversion_error());
    }

    #[test]
    fn test_date_round_trip_is_structured() {
        let t = FieldType::Date;
        let native = t.to_native(&json!("2015-03-14T09:26:53+00:00")).unwrap();
        assert!(native.as_datetime().is_some());
        assert_eq!(t.from_native(&native).unwrap(), json!("2015-03-14T09:26:53+00:00"));
    }

    #[test]
    fn test_numeric_bounds_metadata() {
        assert_eq!(FieldType::Byte.bounds(), Some(NumericBounds::Integer { min: -128, max: 127 }));
        assert_eq!(
            FieldType::Short.bounds(),
            Some(NumericBounds::Integer { min: -32768, max: 32767 })
        );
        assert_eq!(
            FieldType::Integer.bounds(),
            Some(NumericBounds::Integer { min: -2147483648, max: 2147483647 })
        );
        assert_eq!(FieldType::String.bounds(), None);
        // 范围只是元数据，不做截断
        assert_eq!(FieldType::Byte.to_native(&json!(1000)).unwrap(), DataValue::Int(1000));
    }

    #[test]
    fn test_object_from_native_passes_non_documents_through() {
        let schema = Arc::new(
            DocumentSchema::builder("Author")
                .field("name", FieldType::String)
                .build()
                .unwrap(),
        );
        for t in [FieldType::Object(schema.clone().into()), FieldType::Nested(schema.clone().into())] {
            let mut raw = std::collections::HashMap::new();
            raw.insert("name".to_string(), DataValue::from("Ann"));
            raw.insert("extra".to_string(), DataValue::Int(1));
            assert_eq!(
                t.from_native(&DataValue::Object(raw)).unwrap(),
                json!({"name": "Ann", "extra": 1})
            );
            assert_eq!(t.from_native(&DataValue::from("plain")).unwrap(), json!("plain"));

            let doc = Document::new(schema.clone()).with("name", "Bob").with("extra", 2);
            assert_eq!(t.from_native(&DataValue::from(doc)).unwrap(), json!({"name": "Bob"}));
        }
    }
}
