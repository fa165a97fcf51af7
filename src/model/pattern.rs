//! 动态字段匹配模式
//!
//! glob 风格：`*` 匹配任意字符序列，`?` 匹配单个字符，`[...]` 为字符集合（`[!...]` 取反，`[^...]` 中的 `^` 为字面量）

use crate::error::EsDocResult;
use regex::Regex;

/// 已编译的 glob 模式
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    /// 编译模式
    pub fn new(pattern: &str) -> EsDocResult<Self> {
        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| {
            crate::es_error!(schema, pattern, format!("无效的动态字段模式: {}", e))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// 原始模式文本
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// 是否为匹配一切的 `*`
    pub fn is_match_all(&self) -> bool {
        self.pattern == "*"
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl PartialEq for GlobPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 12);
    // `*` 与 `?` 也匹配换行
    out.push_str("(?s)^");

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                // 找到对应的 ']'，找不到时按字面量处理
                let close = chars[i + 1..]
                    .iter()
                    .enumerate()
                    .skip(1)
                    .find(|(_, c)| **c == ']')
                    .map(|(offset, _)| i + 1 + offset);
                match close {
                    Some(end) => {
                        let mut body = String::new();
                        for c in &chars[i + 1..end] {
                            if matches!(c, '\\' | '[' | '&' | '~') {
                                body.push('\\');
                            }
                            body.push(*c);
                        }
                        if let Some(rest) = body.strip_prefix('!') {
                            body = format!("^{}", rest);
                        } else if body.starts_with('^') {
                            // `^` 只有 `!` 表示取反，开头的 `^` 按字面量处理
                            body.insert(0, '\\');
                        }
                        out.push('[');
                        out.push_str(&body);
                        out.push(']');
                        i = end;
                    }
                    None => out.push_str(&regex::escape("[")),
                }
            }
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    out
}
