//! 客户端持久化存储
//! Cookie 风格（带过期时间）与本地存储共用同一个键值接口

use crate::error::{ConsoleError, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 键值存储
pub trait KeyValueStore: Send + Sync {
    /// 读取未过期的值
    fn get(&self, key: &str) -> Option<String>;

    /// 写入多个键，`ttl` 为 None 时永不过期；要么全部写入，要么全部不写入
    fn set_many(&self, entries: &[(&str, &str, Option<Duration>)]) -> Result<()>;

    /// 删除多个键
    fn remove_many(&self, keys: &[&str]) -> Result<()>;

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.set_many(&[(key, value, ttl)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.remove_many(&[key])
    }

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Utc::now() + ttl),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 内存存储（测试与嵌入场景）
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries.lock().values().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(Utc::now()) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn set_many(&self, items: &[(&str, &str, Option<Duration>)]) -> Result<()> {
        let mut entries = self.entries.lock();
        for (key, value, ttl) in items {
            entries.insert(key.to_string(), Entry::new(value, *ttl));
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

/// 文件存储
///
/// 整个键值表以 JSON 保存；写入先落到临时文件再重命名，崩溃时不会留下半个文件
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Entry>>,
}

impl FileStore {
    /// 打开（或创建）存储文件
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, Entry>>(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Corrupted store file, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        let now = Utc::now();
        let entries = entries.into_iter().filter(|(_, e)| !e.is_expired(now)).collect();

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, Entry>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            ConsoleError::storage(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|e| !e.is_expired(Utc::now()))
            .map(|e| e.value.clone())
    }

    fn set_many(&self, items: &[(&str, &str, Option<Duration>)]) -> Result<()> {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        for (key, value, ttl) in items {
            next.insert(key.to_string(), Entry::new(value, *ttl));
        }
        // 落盘成功后才替换内存表
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock();
        if !keys.iter().any(|k| entries.contains_key(*k)) {
            return Ok(());
        }
        let mut next = entries.clone();
        for key in keys {
            next.remove(*key);
        }
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}
