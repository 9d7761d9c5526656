//! # Tauri 命令层
//!
//! 命令层仅做 IPC 参数接收与结果返回，所有实际处理交由 `TransferCoordinator`。

use serde_json::Value;
use tauri::{AppHandle, State};

use super::{SETTINGS_FILE, app_data_file};
use crate::coordinator::selection::TextSelection;
use crate::coordinator::{SavedPanelState, TransferCoordinator};
use crate::error::TransferError;
use crate::settings::{ConfigurationChange, JsonSettingsSource};

/// 渲染面发来的消息（`{ type, data? }`）。
#[tauri::command]
pub async fn surface_message(
    state: State<'_, TransferCoordinator>,
    message: Value,
) -> Result<(), TransferError> {
    state.handle_message(message).await
}

/// 渲染面加载完成：有保存状态则恢复，否则作为新面板激活。
#[tauri::command]
pub fn open_panel(
    state: State<'_, TransferCoordinator>,
    saved: Option<SavedPanelState>,
) -> Result<(), TransferError> {
    match saved {
        Some(saved) => state.restore(saved),
        None => state.activate(),
    }
}

/// 嵌入方编辑器上报的选区变化。
#[tauri::command]
pub fn editor_selection_changed(
    state: State<'_, TransferCoordinator>,
    selections: Vec<TextSelection>,
) -> Result<bool, TransferError> {
    state.on_selection_changed(&selections)
}

/// 读取设置文件原文，文件不存在时返回 `None`。
#[tauri::command]
pub fn get_app_settings(app: AppHandle) -> Result<Option<Value>, TransferError> {
    JsonSettingsSource::new(app_data_file(&app, SETTINGS_FILE)?).load()
}

/// 保存设置，并把顶层各节作为一次配置变更通知协调器。
#[tauri::command]
pub fn set_app_settings(
    app: AppHandle,
    state: State<'_, TransferCoordinator>,
    settings: Value,
) -> Result<(), TransferError> {
    JsonSettingsSource::new(app_data_file(&app, SETTINGS_FILE)?).save(&settings)?;

    let sections = settings
        .as_object()
        .map(|map| map.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    state.on_configuration_changed(&ConfigurationChange::new(sections))?;
    Ok(())
}
