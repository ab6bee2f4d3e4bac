//! 应用通用错误

use super::{PolicyError, WindowError};

/// 应用通用错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误
    #[error("JSON 序列化失败: {0}")]
    Serde(#[from] serde_json::Error),

    /// 窗口管理器错误
    #[error("窗口错误: {0}")]
    Window(#[from] WindowError),

    /// 策略配置错误
    #[error("预加载策略错误: {0}")]
    Policy(#[from] PolicyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "文件未找到");
        let err = AppError::Io(io_err);
        assert!(err.to_string().contains("IO 错误"));
    }

    #[test]
    fn test_window_error_chain() {
        let err = AppError::from(WindowError::NotInitialized);
        assert!(err.to_string().contains("尚未初始化"));

        use std::error::Error;
        assert!(err.source().is_some());
    }
}
