//! 预加载后端相关错误

use super::CacheError;

/// 预加载后端错误类型
///
/// 对窗口管理器而言都是可恢复的警告：记账照常进行。
#[derive(Debug, thiserror::Error)]
pub enum PreloadError {
    /// 预加载 worker 已退出
    #[error("预加载 worker 已退出")]
    WorkerGone,

    /// 缓存写入失败
    #[error("缓存操作失败: {0}")]
    Cache(#[from] CacheError),

    /// 后端拒绝了请求
    #[error("后端拒绝请求: {0}")]
    Rejected(String),
}

impl PreloadError {
    /// 下一次 invalidate 时是否值得重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, PreloadError::Cache(_) | PreloadError::Rejected(_))
    }
}

/// 预加载优先级策略错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// 规则未按 max_distance 严格递增
    #[error("规则未按距离严格递增: 第 {position} 条 max_distance={max_distance}")]
    UnorderedRules { position: usize, max_distance: usize },
}
