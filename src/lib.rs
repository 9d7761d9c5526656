//! # Polacode — 库入口
//!
//! 将选中的代码渲染成图片，并保存为 PNG 文件或以原生图片格式写入剪贴板。
//! 渲染本身由隔离的渲染面（webview）完成，本库是特权宿主侧的传输协调器。
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            渲染面 (webview，无文件/剪贴板权限)            │
//! │    canvas → RGBA 像素 / PNG 序列化字节串                 │
//! └───────┬──────────────────────────────────────▲───────────┘
//!         │ CaptureRequest {type, data?}         │ SyncMessage {type, ...}
//! ┌───────▼──────────────────────────────────────┴───────────┐
//! │                 传输协调器 (Rust)                         │
//! │                                                          │
//! │  ┌─ protocol ──── 消息解析 / 序列化                       │
//! │  ├─ coordinator ─ 生命周期 + 分发表 + 选区同步            │
//! │  ├─ codec ─────── 序列化字节串解码 / RGBA → 32 位字打包    │
//! │  ├─ sink ──────── 文件写入 / 剪贴板写入 (arboard)         │
//! │  ├─ settings ──── 配置读取 + UpdateSettings 推送          │
//! │  ├─ storage ───── 持久化背景色 (JSON 键值存储)            │
//! │  └─ session ───── 上次保存路径                            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `TransferError` |
//! | [`codec`] | `encode_blob` / `pack` 等纯转换 |
//! | [`protocol`] | `CaptureRequest` / `SyncMessage` 线上格式 |
//! | [`host`] | 宿主协作方 trait 与 `HostServices` |
//! | [`coordinator`] | 面板生命周期、消息分发、选区同步 |
//! | [`sink`] | 文件与剪贴板输出端 |
//! | [`settings`] | 外部配置读取与设置同步 |
//! | [`storage`] | 跨重启保留的全局状态 |
//! | [`session`] | 面板级会话状态 |
//! | `desktop` | Tauri 宿主实现（`desktop` 特性） |

pub mod error;
pub mod codec;
pub mod protocol;
pub mod host;
pub mod coordinator;
pub mod sink;
pub mod settings;
pub mod storage;
pub mod session;

#[cfg(feature = "desktop")]
pub mod desktop;

pub use coordinator::{PanelLifecycle, SavedPanelState, TransferCoordinator};
pub use error::TransferError;
pub use host::HostServices;
