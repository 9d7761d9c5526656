//! # 传输协调器
//!
//! ## 设计思路
//!
//! `TransferCoordinator` 运行在特权宿主侧，是渲染面请求的唯一入口：
//! 持有会话状态、分发表与选区监听器，所有外部能力都经 `HostServices` 注入。
//! 渲染面与协调器之间只交换消息，不共享任何可变内存。
//!
//! 面板生命周期：
//!
//! ```text
//! Uninitialized ──activate/restore──▶ Active ──dispose──▶ Disposed（终态）
//! ```
//!
//! ## 实现思路
//!
//! - 分发使用对 `CaptureRequest` 的穷尽 `match`，新增请求类型时由编译器检查。
//! - 保存对话框是一个被 await 的 future；等待期间不持有任何锁，其他消息照常处理。
//!   `last_used_image_path` 只在读取默认值和最终写回时短暂加锁，最后写入者胜出。
//! - 剪贴板失败在此边界被吞掉并记录日志；文件写入失败先通知用户再向上返回。

pub mod selection;

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::Deserialize;
use serde_json::Value;

use crate::codec::{self, Dimensions};
use crate::error::TransferError;
use crate::host::HostServices;
use crate::protocol::{CaptureRequest, SyncMessage};
use crate::session::SessionState;
use crate::settings::{ConfigurationChange, EDITOR_SECTION, FONT_FAMILY_KEY, SettingsSynchronizer};
use crate::sink::file::{sniff_image_format, write_file};
use crate::storage::{read_bg_color, write_bg_color};

use selection::{SelectionSync, TextSelection};

/// 渲染面报告粘贴内容无效时显示的提示。
pub const INVALID_PASTE_NOTICE: &str = "Pasted content is invalid. Only copy from VS Code and check if your shortcuts for copy/paste have conflicts.";

/// 面板生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLifecycle {
    Uninitialized,
    Active,
    Disposed,
}

/// 面板从保存状态恢复时携带的数据。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SavedPanelState {
    #[serde(rename = "innerHTML", default)]
    pub inner_html: Option<String>,
}

/// 单个面板实例的传输协调器。
pub struct TransferCoordinator {
    host: HostServices,
    settings: SettingsSynchronizer,
    session: Mutex<SessionState>,
    lifecycle: Mutex<PanelLifecycle>,
    selection: Mutex<Option<SelectionSync>>,
}

impl TransferCoordinator {
    pub fn new(host: HostServices, session: SessionState) -> Self {
        let settings = SettingsSynchronizer::new(host.settings.clone(), host.channel.clone());
        Self {
            host,
            settings,
            session: Mutex::new(session),
            lifecycle: Mutex::new(PanelLifecycle::Uninitialized),
            selection: Mutex::new(None),
        }
    }

    pub fn lifecycle(&self) -> Result<PanelLifecycle, TransferError> {
        Ok(*self.lifecycle_guard()?)
    }

    pub fn last_used_image_path(&self) -> Result<PathBuf, TransferError> {
        Ok(self.session_guard()?.last_used_image_path.clone())
    }

    /// 新建面板：安装监听器，推送 `Init`，随后同步设置。
    pub fn activate(&self) -> Result<(), TransferError> {
        self.enter_active()?;

        let font_family = self.host.settings.get(EDITOR_SECTION, FONT_FAMILY_KEY);
        let bg_color = read_bg_color(self.host.state.as_ref())?;
        self.host.channel.post(SyncMessage::Init { font_family, bg_color })?;

        log::info!("面板已激活");
        self.settings.sync()
    }

    /// 从保存状态恢复面板：安装监听器，推送 `Restore`。
    ///
    /// 设置由渲染面随后发来的 `getAndUpdateCacheAndSettings` 触发同步。
    pub fn restore(&self, saved: SavedPanelState) -> Result<(), TransferError> {
        self.enter_active()?;

        let bg_color = read_bg_color(self.host.state.as_ref())?;
        self.host.channel.post(SyncMessage::Restore {
            inner_html: saved.inner_html,
            bg_color,
        })?;

        log::info!("面板已从保存状态恢复");
        Ok(())
    }

    /// 关闭面板并卸载选区监听器。重复调用无副作用。
    pub fn dispose(&self) -> Result<(), TransferError> {
        let mut lifecycle = self.lifecycle_guard()?;
        if *lifecycle == PanelLifecycle::Disposed {
            return Ok(());
        }
        *lifecycle = PanelLifecycle::Disposed;
        drop(lifecycle);

        let listener = self
            .selection
            .lock()
            .map_err(|_| TransferError::Lifecycle("选区监听器锁已中毒".to_string()))?
            .take();
        drop(listener);

        log::info!("面板已关闭");
        Ok(())
    }

    /// 入站消息入口：解析后分发，未识别的 `type` 忽略。
    ///
    /// 面板未激活时先于解析直接丢弃，损坏的消息也不会报错。
    pub async fn handle_message(&self, message: Value) -> Result<(), TransferError> {
        let kind = message
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);

        if self.lifecycle()? != PanelLifecycle::Active {
            log::debug!("面板未处于激活状态，丢弃消息 {:?}", kind);
            return Ok(());
        }

        match CaptureRequest::from_message(message)? {
            Some(request) => self.dispatch(request).await,
            None => {
                log::debug!("忽略未识别的消息类型: {:?}", kind);
                Ok(())
            }
        }
    }

    /// 分发表：每种请求对应一个处理动作。
    pub async fn dispatch(&self, request: CaptureRequest) -> Result<(), TransferError> {
        if self.lifecycle()? != PanelLifecycle::Active {
            log::debug!("面板未处于激活状态，丢弃消息 {}", request.tag());
            return Ok(());
        }

        match request {
            CaptureRequest::SaveToFile { serialized_blob } => self.save_to_file(&serialized_blob).await,
            CaptureRequest::SaveToClipboard { pixels, dimensions } => {
                self.save_to_clipboard(pixels.as_deref(), dimensions)
            }
            CaptureRequest::QueryState => self.restore_cached_state(),
            CaptureRequest::UpdateBackgroundColor { color } => {
                write_bg_color(self.host.state.as_ref(), &color)?;
                log::debug!("背景色已更新为 {}", color);
                Ok(())
            }
            CaptureRequest::InvalidContent => {
                self.host.notifier.info(INVALID_PASTE_NOTICE);
                Ok(())
            }
        }
    }

    /// 选区变更事件；面板关闭后监听器已卸载，不再触发任何消息。
    pub fn on_selection_changed(&self, selections: &[TextSelection]) -> Result<bool, TransferError> {
        let listener = self
            .selection
            .lock()
            .map_err(|_| TransferError::Lifecycle("选区监听器锁已中毒".to_string()))?;

        match listener.as_ref() {
            Some(listener) => listener.handle(selections),
            None => Ok(false),
        }
    }

    /// 配置变更事件，返回是否推送了新设置。
    pub fn on_configuration_changed(&self, change: &ConfigurationChange) -> Result<bool, TransferError> {
        if self.lifecycle()? != PanelLifecycle::Active || !change.is_relevant() {
            return Ok(false);
        }
        self.settings.sync()?;
        Ok(true)
    }

    pub fn sync_settings(&self) -> Result<(), TransferError> {
        self.settings.sync()
    }

    async fn save_to_file(&self, serialized_blob: &str) -> Result<(), TransferError> {
        let default_path = self.last_used_image_path()?;

        let Some(path) = self.host.dialog.prompt(&default_path).await else {
            log::info!("用户取消了保存");
            return Ok(());
        };

        let bytes = codec::encode_blob(serialized_blob)?;
        match sniff_image_format(&bytes) {
            Some(image::ImageFormat::Png) => {}
            Some(format) => log::warn!("⚠️ 待保存数据格式为 {:?}，按原样写入", format),
            None => log::warn!("⚠️ 无法识别待保存数据的图片格式，按原样写入"),
        }

        if let Err(err) = write_file(&path, &bytes) {
            log::error!("保存图片到 {} 失败: {}", path.display(), err);
            self.host
                .notifier
                .error(&format!("保存图片失败（{}）: {}", path.display(), err));
            return Err(err);
        }

        log::info!("✅ 图片已保存到 {}（{} 字节）", path.display(), bytes.len());
        self.session_guard()?.last_used_image_path = path;
        Ok(())
    }

    fn save_to_clipboard(&self, pixels: Option<&[u8]>, dimensions: Dimensions) -> Result<(), TransferError> {
        let packed = codec::pack(pixels)?;

        if let Err(err) = self.host.clipboard.write_image(&packed, dimensions) {
            log::error!(
                "❌ 写入剪贴板失败（{}x{}，{} 像素）: {}",
                dimensions.width,
                dimensions.height,
                packed.len(),
                err
            );
        }
        Ok(())
    }

    fn restore_cached_state(&self) -> Result<(), TransferError> {
        let bg_color = read_bg_color(self.host.state.as_ref())?;
        self.host
            .channel
            .post(SyncMessage::RestoreBackgroundColor { bg_color })?;
        self.settings.sync()
    }

    fn enter_active(&self) -> Result<(), TransferError> {
        let mut lifecycle = self.lifecycle_guard()?;
        if *lifecycle != PanelLifecycle::Uninitialized {
            return Err(TransferError::Lifecycle(format!(
                "面板当前为 {:?}，无法再次激活",
                *lifecycle
            )));
        }
        *lifecycle = PanelLifecycle::Active;
        drop(lifecycle);

        let listener = SelectionSync::install(self.host.editor.clone(), self.host.channel.clone());
        *self
            .selection
            .lock()
            .map_err(|_| TransferError::Lifecycle("选区监听器锁已中毒".to_string()))? = Some(listener);
        Ok(())
    }

    fn lifecycle_guard(&self) -> Result<MutexGuard<'_, PanelLifecycle>, TransferError> {
        self.lifecycle
            .lock()
            .map_err(|_| TransferError::Lifecycle("生命周期锁已中毒".to_string()))
    }

    fn session_guard(&self) -> Result<MutexGuard<'_, SessionState>, TransferError> {
        self.session
            .lock()
            .map_err(|_| TransferError::State("会话状态锁已中毒".to_string()))
    }
}
