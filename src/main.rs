// 防止在 Windows 发布版本中显示额外的控制台窗口，不要删除！
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! # Polacode 桌面版 — 应用入口
//!
//! 本文件仅负责应用初始化与插件/命令注册。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use polacode::coordinator::TransferCoordinator;
use polacode::desktop::{self, commands};
use polacode::session::SessionState;
use tauri::Manager;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            log::info!("setup: begin");

            let services = desktop::host_services(app.handle())?;
            app.manage(TransferCoordinator::new(services, SessionState::default()));

            log::info!("setup: complete");
            Ok(())
        })
        // 渲染面窗口销毁即面板关闭
        .on_window_event(|window, event| {
            if window.label() == desktop::SURFACE_WINDOW
                && matches!(event, tauri::WindowEvent::Destroyed)
            {
                if let Err(err) = window.state::<TransferCoordinator>().dispose() {
                    log::warn!("关闭面板失败: {err}");
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::surface_message,
            commands::open_panel,
            commands::editor_selection_changed,
            commands::get_app_settings,
            commands::set_app_settings,
        ])
        .run(tauri::generate_context!())
        .expect("运行 Tauri 应用时出错");
}
