//! 滑动窗口相关错误

use crate::window::ItemCount;

/// 窗口索引集合的内部不变量被破坏
///
/// 正确使用 `SlidingWindowManager` 时不会出现，出现即说明窗口逻辑有缺陷。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexSetError {
    /// 插入位置破坏了严格递增顺序
    #[error("索引顺序被破坏: index={index}, bound={bound}")]
    OrderViolation { index: usize, bound: usize },

    /// 窗口为空
    #[error("窗口为空")]
    Empty,
}

/// 窗口管理器错误类型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// 尚未调用 initialize
    #[error("窗口管理器尚未初始化")]
    NotInitialized,

    /// 重复调用 initialize
    #[error("窗口管理器已经初始化")]
    AlreadyInitialized,

    /// 已释放，不再接受位置变化
    #[error("窗口管理器已释放")]
    Released,

    /// 当前索引超出条目范围
    #[error("索引越界: index={index}, total={total}")]
    IndexOutOfRange { index: usize, total: usize },

    /// 窗口参数无效
    #[error("窗口参数无效: {0}")]
    InvalidConfig(String),

    /// initialize 的条目数与条目来源报告的不一致
    #[error("条目数不一致: requested={requested:?}, source={available:?}")]
    ItemCountMismatch {
        requested: ItemCount,
        available: ItemCount,
    },

    /// 索引集合内部错误
    #[error("窗口索引集合错误: {0}")]
    IndexSet(#[from] IndexSetError),
}

impl WindowError {
    /// 生命周期误用（调用方的编程错误）
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            WindowError::NotInitialized | WindowError::AlreadyInitialized | WindowError::Released
        )
    }
}
