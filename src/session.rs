use std::path::PathBuf;

/// 默认建议的保存文件名（位于桌面目录下）
pub const DEFAULT_IMAGE_FILE: &str = "code.png";

/// 单个面板实例的会话状态，由协调器独占。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// 上一次成功保存图片的路径，作为下一次保存对话框的默认路径。
    pub last_used_image_path: PathBuf,
}

impl SessionState {
    pub fn new(last_used_image_path: PathBuf) -> Self {
        Self { last_used_image_path }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(default_image_path())
    }
}

/// `<home>/Desktop/code.png`；无法定位用户目录时退回当前目录。
pub fn default_image_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Desktop")
        .join(DEFAULT_IMAGE_FILE)
}
