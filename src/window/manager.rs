//! 滑动窗口管理器
//!
//! 当前播放位置接近窗口边缘时，按批次向该方向扩展并从另一端逐出，
//! 保持窗口大小不超过 `target_window_size`。每一步先 add 后 remove。

use crate::error::{PreloadError, WindowError};
use crate::preload::{ItemSource, PreloadBackend, PreloadPriorityPolicy};

use super::config::{ItemCount, WindowConfig};
use super::index_set::WindowIndexSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    Ready,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    Forward,
    Backward,
}

/// 一次调用对窗口做出的改动
#[derive(Debug, Default)]
pub struct WindowUpdate {
    /// 按通知顺序新增的索引
    pub added: Vec<usize>,
    /// 按通知顺序逐出的索引
    pub removed: Vec<usize>,
    pub shift: Option<ShiftDirection>,
    /// 后端报告的失败；不影响窗口记账
    pub warnings: Vec<PreloadError>,
}

impl WindowUpdate {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub struct SlidingWindowManager<S, B>
where
    S: ItemSource,
    B: PreloadBackend<S::Item>,
{
    source: S,
    backend: B,
    policy: PreloadPriorityPolicy,
    window: WindowIndexSet,
    config: WindowConfig,
    total: ItemCount,
    current_index: Option<usize>,
    state: ManagerState,
}

impl<S, B> SlidingWindowManager<S, B>
where
    S: ItemSource,
    B: PreloadBackend<S::Item>,
{
    pub fn new(source: S, backend: B, policy: PreloadPriorityPolicy) -> Self {
        Self {
            source,
            backend,
            policy,
            window: WindowIndexSet::new(),
            config: WindowConfig::default(),
            total: ItemCount::Finite(0),
            current_index: None,
            state: ManagerState::Uninitialized,
        }
    }

    /// 用 `[0, min(target, total))` 填充窗口
    pub fn initialize(
        &mut self,
        total: ItemCount,
        config: WindowConfig,
    ) -> Result<WindowUpdate, WindowError> {
        if self.state != ManagerState::Uninitialized {
            return Err(WindowError::AlreadyInitialized);
        }
        config.validate()?;
        let available = self.source.item_count();
        if total != available {
            return Err(WindowError::ItemCountMismatch {
                requested: total,
                available,
            });
        }

        self.config = config;
        self.total = total;
        self.window = WindowIndexSet::with_capacity(config.target_window_size + 1);

        let mut update = WindowUpdate::default();
        for index in 0..total.cap(config.target_window_size) {
            self.window.push_back(index)?;
            self.notify_add(index, &mut update);
        }
        self.invalidate_backend(&mut update);
        self.state = ManagerState::Ready;

        tracing::info!(
            total = ?total,
            target = config.target_window_size,
            edge = config.edge_threshold,
            batch = config.shift_batch_size,
            retained = self.window.len(),
            "滑动窗口已初始化"
        );
        Ok(update)
    }

    pub fn on_current_index_changed(
        &mut self,
        new_index: usize,
    ) -> Result<WindowUpdate, WindowError> {
        match self.state {
            ManagerState::Uninitialized => return Err(WindowError::NotInitialized),
            ManagerState::Released => return Err(WindowError::Released),
            ManagerState::Ready => {}
        }
        if let ItemCount::Finite(total) = self.total
            && new_index >= total
        {
            return Err(WindowError::IndexOutOfRange {
                index: new_index,
                total,
            });
        }

        let mut update = WindowUpdate::default();
        if self.current_index == Some(new_index) {
            return Ok(update);
        }
        self.current_index = Some(new_index);

        if !self.window.is_empty() {
            let leftmost = self.window.leftmost()?;
            let rightmost = self.window.rightmost()?;
            let edge = self.config.edge_threshold;

            // 两个条件同时满足时向前优先
            if rightmost <= new_index.saturating_add(edge) {
                update.shift = Some(ShiftDirection::Forward);
                self.shift_forward(&mut update)?;
            } else if new_index <= leftmost.saturating_add(edge) && leftmost > 0 {
                update.shift = Some(ShiftDirection::Backward);
                self.shift_backward(&mut update)?;
            }
        }

        self.policy.set_current_index(new_index);
        self.invalidate_backend(&mut update);

        tracing::debug!(
            index = new_index,
            shift = ?update.shift,
            added = ?update.added,
            removed = ?update.removed,
            "当前索引变化"
        );
        Ok(update)
    }

    /// 逐出全部索引并释放后端；重复调用无副作用
    pub fn release(&mut self) -> WindowUpdate {
        let mut update = WindowUpdate::default();
        match self.state {
            ManagerState::Released => return update,
            ManagerState::Uninitialized => {
                self.state = ManagerState::Released;
                return update;
            }
            ManagerState::Ready => {}
        }
        while let Ok(index) = self.window.pop_front() {
            self.notify_remove(index, &mut update);
        }
        self.backend.release();
        self.state = ManagerState::Released;
        tracing::info!(removed = update.removed.len(), "滑动窗口已释放");
        update
    }

    fn shift_forward(&mut self, update: &mut WindowUpdate) -> Result<(), WindowError> {
        for _ in 0..self.config.shift_batch_size {
            let next = self.window.rightmost()? + 1;
            if !self.total.contains(next) {
                break;
            }
            self.window.push_back(next)?;
            self.notify_add(next, update);
            if self.window.len() > self.config.target_window_size {
                let evicted = self.window.pop_front()?;
                self.notify_remove(evicted, update);
            }
        }
        Ok(())
    }

    fn shift_backward(&mut self, update: &mut WindowUpdate) -> Result<(), WindowError> {
        for _ in 0..self.config.shift_batch_size {
            let leftmost = self.window.leftmost()?;
            let Some(prev) = leftmost.checked_sub(1) else {
                break;
            };
            self.window.push_front(prev)?;
            self.notify_add(prev, update);
            if self.window.len() > self.config.target_window_size {
                let evicted = self.window.pop_back()?;
                self.notify_remove(evicted, update);
            }
        }
        Ok(())
    }

    fn notify_add(&mut self, index: usize, update: &mut WindowUpdate) {
        let item = self.source.item(index);
        if let Err(e) = self.backend.add(item, index) {
            tracing::warn!(index, err = %e, "后端 add 失败，索引仍保留在窗口中");
            update.warnings.push(e);
        }
        update.added.push(index);
    }

    fn notify_remove(&mut self, index: usize, update: &mut WindowUpdate) {
        let item = self.source.item(index);
        if let Err(e) = self.backend.remove(&item) {
            tracing::warn!(index, err = %e, "后端 remove 失败，索引已从窗口移除");
            update.warnings.push(e);
        }
        update.removed.push(index);
    }

    fn invalidate_backend(&mut self, update: &mut WindowUpdate) {
        if let Err(e) = self.backend.invalidate(&self.policy) {
            tracing::warn!(err = %e, "后端 invalidate 失败");
            update.warnings.push(e);
        }
    }

    pub fn window(&self) -> &WindowIndexSet {
        &self.window
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn total_item_count(&self) -> ItemCount {
        self.total
    }

    pub fn policy(&self) -> &PreloadPriorityPolicy {
        &self.policy
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Indices(ItemCount);

    impl ItemSource for Indices {
        type Item = usize;

        fn item(&self, index: usize) -> usize {
            index
        }

        fn item_count(&self) -> ItemCount {
            self.0
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Add(usize),
        Remove(usize),
        Invalidate(Option<usize>),
        Release,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        fail_adds: bool,
    }

    impl Recorder {
        fn adds_and_removes(&self) -> Vec<Call> {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Add(_) | Call::Remove(_)))
                .cloned()
                .collect()
        }
    }

    impl PreloadBackend<usize> for Recorder {
        fn add(&mut self, item: usize, _rank: usize) -> Result<(), PreloadError> {
            self.calls.push(Call::Add(item));
            if self.fail_adds {
                return Err(PreloadError::Rejected("cache full".to_owned()));
            }
            Ok(())
        }

        fn remove(&mut self, item: &usize) -> Result<(), PreloadError> {
            self.calls.push(Call::Remove(*item));
            Ok(())
        }

        fn invalidate(&mut self, policy: &PreloadPriorityPolicy) -> Result<(), PreloadError> {
            self.calls.push(Call::Invalidate(policy.current_index()));
            Ok(())
        }

        fn release(&mut self) {
            self.calls.push(Call::Release);
        }
    }

    fn manager(total: ItemCount) -> SlidingWindowManager<Indices, Recorder> {
        let mut m = SlidingWindowManager::new(
            Indices(total),
            Recorder::default(),
            PreloadPriorityPolicy::default(),
        );
        m.initialize(total, WindowConfig::default()).unwrap();
        m.backend_mut().calls.clear();
        m
    }

    #[test]
    fn test_initialize_fills_window() {
        let mut m = SlidingWindowManager::new(
            Indices(ItemCount::Finite(100)),
            Recorder::default(),
            PreloadPriorityPolicy::default(),
        );
        let update = m
            .initialize(ItemCount::Finite(100), WindowConfig::default())
            .unwrap();
        assert_eq!(update.added, (0..10).collect::<Vec<_>>());
        assert_eq!(m.window().to_vec(), (0..10).collect::<Vec<_>>());
        assert_eq!(m.state(), ManagerState::Ready);
        assert_eq!(m.backend().calls.last(), Some(&Call::Invalidate(None)));
    }

    #[test]
    fn test_forward_shift_interleaves_add_and_remove() {
        let mut m = manager(ItemCount::Finite(100));
        let update = m.on_current_index_changed(8).unwrap();

        assert_eq!(update.shift, Some(ShiftDirection::Forward));
        assert_eq!(update.added, vec![10, 11, 12, 13]);
        assert_eq!(update.removed, vec![0, 1, 2, 3]);
        assert_eq!(m.window().to_vec(), (4..14).collect::<Vec<_>>());
        assert_eq!(
            m.backend().calls,
            vec![
                Call::Add(10),
                Call::Remove(0),
                Call::Add(11),
                Call::Remove(1),
                Call::Add(12),
                Call::Remove(2),
                Call::Add(13),
                Call::Remove(3),
                Call::Invalidate(Some(8)),
            ]
        );
    }

    #[test]
    fn test_inside_window_no_shift() {
        let mut m = manager(ItemCount::Finite(100));
        let update = m.on_current_index_changed(5).unwrap();
        assert!(update.is_noop());
        assert_eq!(update.shift, None);
        assert_eq!(m.window().to_vec(), (0..10).collect::<Vec<_>>());
        assert_eq!(m.backend().calls, vec![Call::Invalidate(Some(5))]);
    }

    #[test]
    fn test_backward_shift() {
        let mut m = manager(ItemCount::Finite(100));
        m.on_current_index_changed(8).unwrap();
        m.backend_mut().calls.clear();

        let update = m.on_current_index_changed(6).unwrap();
        assert_eq!(update.shift, Some(ShiftDirection::Backward));
        assert_eq!(update.added, vec![3, 2, 1, 0]);
        assert_eq!(update.removed, vec![13, 12, 11, 10]);
        assert_eq!(m.window().to_vec(), (0..10).collect::<Vec<_>>());
        assert_eq!(m.backend().adds_and_removes()[..2], [Call::Add(3), Call::Remove(13)]);
    }

    #[test]
    fn test_repeated_index_is_noop() {
        let mut m = manager(ItemCount::Finite(100));
        m.on_current_index_changed(8).unwrap();
        let before = m.backend().calls.len();

        let update = m.on_current_index_changed(8).unwrap();
        assert!(update.is_noop());
        assert_eq!(m.backend().calls.len(), before);
    }

    #[test]
    fn test_small_playlist_never_leaves_bounds() {
        let mut m = manager(ItemCount::Finite(5));
        assert_eq!(m.window().to_vec(), vec![0, 1, 2, 3, 4]);
        for index in [4, 3, 0, 2, 4] {
            let update = m.on_current_index_changed(index).unwrap();
            assert!(update.is_noop());
        }
        assert_eq!(m.window().to_vec(), vec![0, 1, 2, 3, 4]);
        assert_eq!(
            m.on_current_index_changed(5).unwrap_err(),
            WindowError::IndexOutOfRange { index: 5, total: 5 }
        );
    }

    #[test]
    fn test_partial_batch_at_playlist_end() {
        let mut m = manager(ItemCount::Finite(12));
        let update = m.on_current_index_changed(8).unwrap();
        assert_eq!(update.added, vec![10, 11]);
        assert_eq!(update.removed, vec![0, 1]);
        assert_eq!(m.window().to_vec(), (2..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_jump_clamps_backward_batch_at_zero() {
        let mut m = manager(ItemCount::Finite(100));
        for index in [8, 12, 16] {
            m.on_current_index_changed(index).unwrap();
        }
        assert_eq!(m.window().to_vec(), (12..22).collect::<Vec<_>>());

        // 跳到 1：只向后平移一个批次
        let update = m.on_current_index_changed(1).unwrap();
        assert_eq!(update.added, vec![11, 10, 9, 8]);
        assert_eq!(m.window().to_vec(), (8..18).collect::<Vec<_>>());
    }

    #[test]
    fn test_unbounded_forward() {
        let mut m = manager(ItemCount::Unbounded);
        for index in 0..1000 {
            m.on_current_index_changed(index).unwrap();
            assert!(m.window().len() <= 10);
            assert!(m.window().contains(index));
        }
    }

    #[test]
    fn test_backend_failures_do_not_break_bookkeeping() {
        let mut m = manager(ItemCount::Finite(100));
        m.backend_mut().fail_adds = true;
        let update = m.on_current_index_changed(8).unwrap();
        assert_eq!(update.warnings.len(), 4);
        assert_eq!(m.window().to_vec(), (4..14).collect::<Vec<_>>());
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut m = SlidingWindowManager::new(
            Indices(ItemCount::Finite(10)),
            Recorder::default(),
            PreloadPriorityPolicy::default(),
        );
        assert_eq!(
            m.on_current_index_changed(0).unwrap_err(),
            WindowError::NotInitialized
        );
        m.initialize(ItemCount::Finite(10), WindowConfig::default())
            .unwrap();
        assert_eq!(
            m.initialize(ItemCount::Finite(10), WindowConfig::default())
                .unwrap_err(),
            WindowError::AlreadyInitialized
        );
        m.release();
        assert_eq!(
            m.on_current_index_changed(1).unwrap_err(),
            WindowError::Released
        );
    }

    #[test]
    fn test_initialize_rejects_count_mismatch() {
        let mut m = SlidingWindowManager::new(
            Indices(ItemCount::Finite(10)),
            Recorder::default(),
            PreloadPriorityPolicy::default(),
        );
        assert_eq!(
            m.initialize(ItemCount::Finite(20), WindowConfig::default())
                .unwrap_err(),
            WindowError::ItemCountMismatch {
                requested: ItemCount::Finite(20),
                available: ItemCount::Finite(10),
            }
        );
        assert_eq!(m.state(), ManagerState::Uninitialized);
        assert!(m.backend().calls.is_empty());

        // 失败后仍可用正确的条目数初始化
        m.initialize(ItemCount::Finite(10), WindowConfig::default())
            .unwrap();
        assert_eq!(m.window().len(), 10);
    }

    #[test]
    fn test_release_before_initialize_skips_backend() {
        let mut m = SlidingWindowManager::new(
            Indices(ItemCount::Finite(10)),
            Recorder::default(),
            PreloadPriorityPolicy::default(),
        );
        let update = m.release();
        assert!(update.is_noop());
        assert_eq!(m.state(), ManagerState::Released);
        assert!(m.backend().calls.is_empty());
        assert_eq!(
            m.initialize(ItemCount::Finite(10), WindowConfig::default())
                .unwrap_err(),
            WindowError::AlreadyInitialized
        );
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut m = manager(ItemCount::Finite(100));
        m.on_current_index_changed(8).unwrap();
        m.backend_mut().calls.clear();

        let update = m.release();
        assert_eq!(update.removed, (4..14).collect::<Vec<_>>());
        assert!(m.window().is_empty());
        assert_eq!(m.backend().calls.len(), 11);
        assert_eq!(m.backend().calls.last(), Some(&Call::Release));

        let again = m.release();
        assert!(again.is_noop());
        assert_eq!(m.backend().calls.len(), 11);
    }
}
