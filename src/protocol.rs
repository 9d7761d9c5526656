//! # 渲染面 ⇄ 宿主消息协议
//!
//! ## 设计思路
//!
//! 渲染面与宿主之间只通过 JSON 消息通信，不共享任何内存：
//! - 入站 `{ type, data? }` 解析为 [`CaptureRequest`]
//! - 出站 [`SyncMessage`] 序列化为按 `type` 打标签的扁平对象
//!
//! 未识别的 `type` 直接忽略（返回 `None`），以兼容渲染面新增但宿主尚未支持的消息。
//! 已识别的 `type` 负载格式错误则视为消息损坏，返回 `Format` 错误。

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::Dimensions;
use crate::error::TransferError;

pub const TAG_SHOOT: &str = "shoot";
pub const TAG_SHOOT_TO_CLIPBOARD: &str = "shootToClipboard";
pub const TAG_QUERY_STATE: &str = "getAndUpdateCacheAndSettings";
pub const TAG_UPDATE_BG_COLOR: &str = "updateBgColor";
pub const TAG_INVALID_PASTE: &str = "invalidPasteContent";

/// 渲染面发往宿主的请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureRequest {
    /// 保存为 PNG 文件，负载为逗号分隔的序列化字节串。
    SaveToFile { serialized_blob: String },
    /// 以原生图片格式写入剪贴板。
    SaveToClipboard {
        pixels: Option<Vec<u8>>,
        dimensions: Dimensions,
    },
    /// 查询持久化背景色并触发一次设置同步。
    QueryState,
    /// 持久化新的背景色。
    UpdateBackgroundColor { color: String },
    /// 渲染面检测到粘贴内容无效。
    InvalidContent,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShootPayload {
    serialized_blob: String,
}

#[derive(Deserialize)]
struct ClipboardPayload {
    #[serde(default, deserialize_with = "deserialize_pixels")]
    pixels: Option<Vec<u8>>,
    dimensions: Dimensions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BgColorPayload {
    bg_color: String,
}

impl CaptureRequest {
    /// 解析一条入站消息。
    ///
    /// # 返回
    /// - `Ok(Some(request))`：已识别的请求
    /// - `Ok(None)`：未识别的 `type`，调用方应忽略
    /// - `Err(TransferError::Format)`：缺少 `type` 或负载与 `type` 不匹配
    pub fn from_message(message: Value) -> Result<Option<Self>, TransferError> {
        let Envelope { kind, data } = serde_json::from_value(message)
            .map_err(|e| TransferError::Format(format!("消息缺少有效的 type 字段: {}", e)))?;

        let request = match kind.as_str() {
            TAG_SHOOT => {
                let payload: ShootPayload = payload_of(&kind, data)?;
                Self::SaveToFile {
                    serialized_blob: payload.serialized_blob,
                }
            }
            TAG_SHOOT_TO_CLIPBOARD => {
                let payload: ClipboardPayload = payload_of(&kind, data)?;
                Self::SaveToClipboard {
                    pixels: payload.pixels,
                    dimensions: payload.dimensions,
                }
            }
            TAG_QUERY_STATE => Self::QueryState,
            TAG_UPDATE_BG_COLOR => {
                let payload: BgColorPayload = payload_of(&kind, data)?;
                Self::UpdateBackgroundColor {
                    color: payload.bg_color,
                }
            }
            TAG_INVALID_PASTE => Self::InvalidContent,
            _ => return Ok(None),
        };

        Ok(Some(request))
    }

    /// 线上协议中的 `type` 标签。
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SaveToFile { .. } => TAG_SHOOT,
            Self::SaveToClipboard { .. } => TAG_SHOOT_TO_CLIPBOARD,
            Self::QueryState => TAG_QUERY_STATE,
            Self::UpdateBackgroundColor { .. } => TAG_UPDATE_BG_COLOR,
            Self::InvalidContent => TAG_INVALID_PASTE,
        }
    }
}

fn payload_of<T>(kind: &str, data: Option<Value>) -> Result<T, TransferError>
where
    T: for<'de> Deserialize<'de>,
{
    let data = data.ok_or_else(|| TransferError::Format(format!("消息 {} 缺少 data", kind)))?;
    serde_json::from_value(data)
        .map_err(|e| TransferError::Format(format!("消息 {} 的 data 格式错误: {}", kind, e)))
}

/// 像素既可能是 JSON 数组，也可能是类型化数组经 JSON 往返后的 `{"0":..,"1":..}` 对象。
fn deserialize_pixels<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(PixelsVisitor)
}

struct PixelsVisitor;

impl<'de> Visitor<'de> for PixelsVisitor {
    type Value = Option<Vec<u8>>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("字节数组或以下标为键的字节对象")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ok(Some(bytes))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut indexed = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, byte)) = map.next_entry::<String, u8>()? {
            let index = key
                .parse::<usize>()
                .map_err(|_| de::Error::custom(format!("像素下标 {:?} 不是整数", key)))?;
            indexed.push((index, byte));
        }

        indexed.sort_unstable_by_key(|(index, _)| *index);
        for (expected, (index, _)) in indexed.iter().enumerate() {
            if *index != expected {
                return Err(de::Error::custom(format!("像素下标不连续，缺少 {}", expected)));
            }
        }

        Ok(Some(indexed.into_iter().map(|(_, byte)| byte).collect()))
    }
}

/// 宿主发往渲染面的同步消息。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
    #[serde(rename = "init", rename_all = "camelCase")]
    Init {
        #[serde(skip_serializing_if = "Option::is_none")]
        font_family: Option<Value>,
        bg_color: String,
    },
    #[serde(rename = "restore")]
    Restore {
        #[serde(rename = "innerHTML", skip_serializing_if = "Option::is_none")]
        inner_html: Option<String>,
        #[serde(rename = "bgColor")]
        bg_color: String,
    },
    #[serde(rename = "restoreBgColor", rename_all = "camelCase")]
    RestoreBackgroundColor { bg_color: String },
    #[serde(rename = "updateSettings", rename_all = "camelCase")]
    UpdateSettings {
        #[serde(skip_serializing_if = "Option::is_none")]
        shadow: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        transparent_background: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        background_color: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<Value>,
        #[serde(rename = "ligature", skip_serializing_if = "Option::is_none")]
        ligature_enabled: Option<Value>,
    },
    #[serde(rename = "update")]
    RequestUpdate,
}
