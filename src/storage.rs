//! 持久化全局状态模块
//!
//! # 设计思路
//!
//! 背景色等少量状态需要跨进程重启保留，但不做版本管理，也不做事务：
//! 一个键值存储，最后写入者胜出。协调器每次处理消息时按需读取，不在内存中缓存。
//!
//! # 实现思路
//!
//! - `StateStore` trait 抽象存储，方便测试注入 `MemoryStateStore`。
//! - `JsonStateStore` 将整张键值表保存为一个 JSON 文件，每次读取都重新读盘。
//! - 写入采用“读取 → 修改 → 整体写回”，进程内用互斥锁串行化写盘。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::error::TransferError;

/// 背景色持久化键
pub const BG_COLOR_KEY: &str = "polacode.bgColor";
/// 背景色默认值
pub const DEFAULT_BG_COLOR: &str = "#2e3440";

/// 持久化键值存储
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, TransferError>;
    fn update(&self, key: &str, value: Value) -> Result<(), TransferError>;
}

/// 读取持久化背景色，缺失或类型不符时回退默认值。
pub fn read_bg_color(store: &dyn StateStore) -> Result<String, TransferError> {
    let color = store
        .get(BG_COLOR_KEY)?
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_BG_COLOR.to_string());
    Ok(color)
}

pub fn write_bg_color(store: &dyn StateStore, color: &str) -> Result<(), TransferError> {
    store.update(BG_COLOR_KEY, Value::String(color.to_string()))
}

/// 基于 JSON 文件的全局状态存储
pub struct JsonStateStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Map<String, Value>, TransferError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(TransferError::State(format!(
                "状态文件 {} 不是 JSON 对象",
                self.path.display()
            ))),
            Err(e) => Err(TransferError::State(format!("解析状态文件失败: {}", e))),
        }
    }
}

impl StateStore for JsonStateStore {
    fn get(&self, key: &str) -> Result<Option<Value>, TransferError> {
        Ok(self.load()?.remove(key))
    }

    fn update(&self, key: &str, value: Value) -> Result<(), TransferError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| TransferError::State("状态写入锁已中毒".to_string()))?;

        let mut map = self.load()?;
        map.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| TransferError::State(format!("序列化状态失败: {}", e)))?;
        fs::write(&self.path, content)?;

        log::debug!("状态已写入 {}: {}", self.path.display(), key);
        Ok(())
    }
}

/// 内存中的状态存储，进程退出即丢失。
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<Value>, TransferError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| TransferError::State("状态读取锁已中毒".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn update(&self, key: &str, value: Value) -> Result<(), TransferError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| TransferError::State("状态写入锁已中毒".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
