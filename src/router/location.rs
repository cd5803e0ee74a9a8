//! 导航目标（路径 + 查询参数）

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Location {
    /// 规范化路径：保证前导 `/`，去掉末尾多余的 `/`
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            query: BTreeMap::new(),
        }
    }

    /// 解析 `path?a=1&b=2` 形式的完整路径
    pub fn parse(full_path: &str) -> Self {
        let (path, query) = match full_path.split_once('?') {
            Some((path, query)) => (path, query),
            None => (full_path, ""),
        };

        Self {
            path: normalize_path(path),
            query: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

impl From<&str> for Location {
    fn from(full_path: &str) -> Self {
        Location::parse(full_path)
    }
}

impl From<String> for Location {
    fn from(full_path: String) -> Self {
        Location::parse(&full_path)
    }
}

pub(crate) fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// 拼接父子路由路径；子路径以 `/` 开头时视为绝对路径
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return normalize_path(child);
    }
    if child.is_empty() {
        return normalize_path(parent);
    }
    normalize_path(&format!("{}/{}", parent.trim_end_matches('/'), child))
}
