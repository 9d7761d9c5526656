//! 设置同步模块
//!
//! # 设计思路
//!
//! 渲染面的阴影、透明背景、背景色、截图目标与连字开关都来自外部配置（只读）。
//! `SettingsSynchronizer` 每次发送前都重新读取配置，不做缓存：
//! 重复调用是幂等的，并且总是与调用时刻的最新配置一致。
//!
//! # 实现思路
//!
//! - `SettingsSource` 以 `(section, key)` 读取任意 JSON 值，贴近编辑器的分节配置模型。
//! - `ConfigurationChange` 描述一次配置变更涉及的键，按点分前缀判断是否相关。
//! - `JsonSettingsSource` 从磁盘上的 `settings.json` 读取，缺省时回退到扩展发布的默认值。

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::TransferError;
use crate::host::SurfaceChannel;
use crate::protocol::SyncMessage;

pub const EXTENSION_SECTION: &str = "polacode";
pub const EDITOR_SECTION: &str = "editor";
pub const FONT_FAMILY_KEY: &str = "fontFamily";
pub const FONT_LIGATURES_KEY: &str = "fontLigatures";

/// 影响渲染面的配置节。
const RELEVANT_SECTIONS: [&str; 3] = ["polacode", "editor.fontFamily", "editor.fontLigatures"];

/// 只读外部配置。
pub trait SettingsSource: Send + Sync {
    fn get(&self, section: &str, key: &str) -> Option<Value>;
}

/// 一次配置变更事件，`keys` 为点分形式的完整键或节名。
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ConfigurationChange {
    pub keys: Vec<String>,
}

impl ConfigurationChange {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// 变更是否影响 `section`：两者相等，或任一方是另一方的点分前缀。
    pub fn affects(&self, section: &str) -> bool {
        self.keys
            .iter()
            .any(|key| is_dotted_prefix(key, section) || is_dotted_prefix(section, key))
    }

    /// 是否需要向渲染面重新推送设置。
    pub fn is_relevant(&self) -> bool {
        RELEVANT_SECTIONS.iter().any(|section| self.affects(section))
    }
}

fn is_dotted_prefix(prefix: &str, full: &str) -> bool {
    full == prefix
        || (full.len() > prefix.len()
            && full.starts_with(prefix)
            && full.as_bytes()[prefix.len()] == b'.')
}

/// 组装并推送 `UpdateSettings`。
#[derive(Clone)]
pub struct SettingsSynchronizer {
    source: Arc<dyn SettingsSource>,
    channel: Arc<dyn SurfaceChannel>,
}

impl SettingsSynchronizer {
    pub fn new(source: Arc<dyn SettingsSource>, channel: Arc<dyn SurfaceChannel>) -> Self {
        Self { source, channel }
    }

    /// 按当前配置组装消息。
    pub fn compose(&self) -> SyncMessage {
        SyncMessage::UpdateSettings {
            shadow: self.source.get(EXTENSION_SECTION, "shadow"),
            transparent_background: self.source.get(EXTENSION_SECTION, "transparentBackground"),
            background_color: self.source.get(EXTENSION_SECTION, "backgroundColor"),
            target: self.source.get(EXTENSION_SECTION, "target"),
            ligature_enabled: self.source.get(EDITOR_SECTION, FONT_LIGATURES_KEY),
        }
    }

    pub fn sync(&self) -> Result<(), TransferError> {
        self.channel.post(self.compose())
    }
}

/// 从 JSON 文件读取配置，形如 `{ "editor": {...}, "polacode": {...} }`。
///
/// 每次读取都重新读盘；文件缺失、损坏或缺少某个键时回退默认值。
pub struct JsonSettingsSource {
    path: PathBuf,
}

impl JsonSettingsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 读取整个设置文档，文件不存在时返回 `None`。
    pub fn load(&self) -> Result<Option<Value>, TransferError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let document = serde_json::from_str::<Value>(&content)
            .map_err(|e| TransferError::State(format!("解析设置文件失败: {}", e)))?;
        Ok(Some(document))
    }

    /// 整体覆盖写回设置文档。
    pub fn save(&self, document: &Value) -> Result<(), TransferError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| TransferError::State(format!("序列化设置失败: {}", e)))?;
        fs::write(&self.path, content)?;

        log::debug!("设置已写入 {}", self.path.display());
        Ok(())
    }

    fn read_document(&self) -> Option<Value> {
        match self.load() {
            Ok(document) => document,
            Err(e) => {
                log::warn!("读取设置文件 {} 失败，使用默认值: {}", self.path.display(), e);
                None
            }
        }
    }
}

impl SettingsSource for JsonSettingsSource {
    fn get(&self, section: &str, key: &str) -> Option<Value> {
        self.read_document()
            .and_then(|document| document.get(section)?.get(key).cloned())
            .or_else(|| default_setting(section, key))
    }
}

/// 扩展发布时的默认配置。
pub fn default_setting(section: &str, key: &str) -> Option<Value> {
    let value = match (section, key) {
        (EXTENSION_SECTION, "shadow") => json!("rgba(0, 0, 0, 0.55) 0px 20px 68px"),
        (EXTENSION_SECTION, "transparentBackground") => json!(false),
        (EXTENSION_SECTION, "backgroundColor") => json!("#f2f2f2"),
        (EXTENSION_SECTION, "target") => json!("container"),
        (EDITOR_SECTION, FONT_FAMILY_KEY) => json!("Menlo, Monaco, 'Courier New', monospace"),
        (EDITOR_SECTION, FONT_LIGATURES_KEY) => json!(false),
        _ => return None,
    };
    Some(value)
}
