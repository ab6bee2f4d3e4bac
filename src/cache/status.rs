//! 宿主侧的缓存状态表：索引 → 状态

use std::collections::HashMap;

use crate::preload::PreloadEvent;
use crate::window::WindowUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Pending,
    Buffered,
    FullyCached,
    Failed,
}

#[derive(Debug, Default)]
pub struct CacheStatusMap {
    statuses: HashMap<usize, CacheStatus>,
}

impl CacheStatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_update(&mut self, update: &WindowUpdate) {
        // 先 added 后 removed，与通知顺序一致
        for &index in &update.added {
            self.statuses.entry(index).or_insert(CacheStatus::Pending);
        }
        for index in &update.removed {
            self.statuses.remove(index);
        }
    }

    /// 返回状态是否被更新；已逐出条目的通知被忽略
    pub fn on_event<I>(&mut self, event: &PreloadEvent<I>) -> bool {
        let Some(status) = self.statuses.get_mut(&event.rank()) else {
            return false;
        };
        *status = match event {
            PreloadEvent::ItemBuffered { .. } => {
                // 已完整缓存的条目不降级
                if *status == CacheStatus::FullyCached {
                    return true;
                }
                CacheStatus::Buffered
            }
            PreloadEvent::ItemFullyCached { .. } => CacheStatus::FullyCached,
            PreloadEvent::PreloadFailed { .. } => CacheStatus::Failed,
        };
        true
    }

    pub fn status(&self, index: usize) -> Option<CacheStatus> {
        self.statuses.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn cached_count(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == CacheStatus::FullyCached)
            .count()
    }
}
