//! 窗口管理器与外部协作方之间的边界

use std::ops::Range;

use crate::error::PreloadError;
use crate::window::ItemCount;

use super::policy::PreloadPriorityPolicy;

/// 按索引提供条目；同一会话内对同一索引必须返回相同条目
pub trait ItemSource {
    type Item: Clone + std::fmt::Debug;

    fn item(&self, index: usize) -> Self::Item;

    fn item_count(&self) -> ItemCount;
}

/// 预加载/缓存后端
///
/// 调用均为同步且不等待实际预加载完成；完成情况通过 [`PreloadEvent`] 异步回报。
pub trait PreloadBackend<I> {
    /// 纳入管理，`rank` 为条目索引
    fn add(&mut self, item: I, rank: usize) -> Result<(), PreloadError>;

    fn remove(&mut self, item: &I) -> Result<(), PreloadError>;

    /// 按策略重新计算所有已纳入条目的优先级
    fn invalidate(&mut self, policy: &PreloadPriorityPolicy) -> Result<(), PreloadError>;

    fn release(&mut self);
}

/// 后端回报的完成通知
///
/// 不保证与窗口平移的先后；针对已被逐出条目的通知必须被消费方忽略。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadEvent<I> {
    ItemBuffered { rank: usize, item: I },
    ItemFullyCached { rank: usize, item: I },
    PreloadFailed { rank: usize, item: I, message: String },
}

impl<I> PreloadEvent<I> {
    pub fn rank(&self) -> usize {
        match self {
            PreloadEvent::ItemBuffered { rank, .. }
            | PreloadEvent::ItemFullyCached { rank, .. }
            | PreloadEvent::PreloadFailed { rank, .. } => *rank,
        }
    }
}

/// 查询某个 key 已缓存的连续字节段；尚无缓存时返回空
pub trait CachedRangeQuery {
    fn cached_spans(&mut self, key: &str) -> Vec<Range<u64>>;
}
