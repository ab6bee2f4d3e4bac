//! 窗口管理器驱动真实后端：进程内排队器与 tokio worker

use feed_preload::cache::{CacheStatus, CacheStatusMap, SpanCache};
use feed_preload::domain::Playlist;
use feed_preload::preload::{
    PreloadEvent, PreloadIntensity, PreloadPriorityPolicy, PreloadQueue, WorkerConfig,
    spawn_preload_worker,
};
use feed_preload::window::{ItemCount, SlidingWindowManager, WindowConfig};

#[test]
fn queue_follows_window_and_current_index() {
    let total = ItemCount::Finite(100);
    let mut m = SlidingWindowManager::new(
        Playlist::new("mem://feed", total),
        PreloadQueue::new(),
        PreloadPriorityPolicy::jump_ready(),
    );
    m.initialize(total, WindowConfig::default()).unwrap();
    assert_eq!(m.backend().len(), 10);

    m.on_current_index_changed(8).unwrap();
    assert_eq!(m.backend().len(), 10);

    // 距离 1 的两侧里索引小的先出
    let head = m.backend().next_task().expect("head task");
    assert_eq!(head.rank, 7);
    assert_eq!(
        head.intensity,
        PreloadIntensity::ShallowBuffer { duration_ms: 1000 }
    );

    let update = m.release();
    assert_eq!(update.removed.len(), 10);
    assert!(m.backend().is_empty());
}

#[tokio::test]
async fn worker_reports_completions_for_window() {
    let total = ItemCount::Finite(100);
    let (backend, mut rx_evt) = spawn_preload_worker(
        SpanCache::in_memory(1 << 30),
        WorkerConfig {
            load_delay_ms: 1,
            bytes_per_second: 1_000,
        },
    );
    let query = backend.clone();
    let mut m = SlidingWindowManager::new(
        Playlist::new("mem://feed", total),
        backend,
        PreloadPriorityPolicy::jump_ready(),
    );
    let mut statuses = CacheStatusMap::new();

    statuses.apply_update(&m.initialize(total, WindowConfig::default()).unwrap());
    statuses.apply_update(&m.on_current_index_changed(1).unwrap());

    // 当前索引 1：0 和 2 相邻、3/4 浅缓冲、5..=9 完整缓存，共 9 个任务
    let mut seen = 0;
    while seen < 9 {
        let evt = rx_evt.recv().await.expect("event");
        assert!(statuses.on_event(&evt));
        seen += 1;
    }
    assert_eq!(statuses.cached_count(), 5);
    assert_eq!(statuses.status(1), Some(CacheStatus::Pending));
    assert_eq!(statuses.status(0), Some(CacheStatus::Buffered));

    let spans = query.cached_spans("media_9").await.unwrap();
    assert_eq!(spans, vec![0..3_000]);

    m.release();
    while let Some(evt) = rx_evt.recv().await {
        assert!(!matches!(evt, PreloadEvent::PreloadFailed { .. }));
    }
}
