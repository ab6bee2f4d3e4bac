//! 一次模拟会话：窗口管理器 + 预加载 worker + 宿主侧缓存状态表

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::time::Duration;

use crate::cache::{CacheStatusMap, SpanCache};
use crate::domain::{MediaItem, Playlist};
use crate::error::{AppError, WindowError};
use crate::preload::{EventReceiver, ItemSource, spawn_preload_worker};
use crate::settings::AppSettings;
use crate::window::{ItemCount, SlidingWindowManager, WindowIndexSet};

#[derive(Debug, Default)]
pub struct SessionReport {
    pub steps: usize,
    pub skipped: usize,
    pub added: usize,
    pub removed: usize,
    pub warnings: usize,
    pub fully_cached: usize,
    pub final_window: Vec<usize>,
}

pub fn format_window(window: &WindowIndexSet) -> String {
    match (window.leftmost(), window.rightmost()) {
        (Ok(l), Ok(r)) => format!("[{l}..={r}] ({})", window.len()),
        _ => "[]".to_owned(),
    }
}

/// 以前进为主的随机单步滚动
pub fn random_walk(total: ItemCount, steps: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos = 0usize;
    let mut path = Vec::with_capacity(steps);
    for _ in 0..steps {
        let forward = rng.gen_bool(0.8);
        pos = if forward {
            let next = pos + 1;
            if total.contains(next) { next } else { pos.saturating_sub(1) }
        } else {
            pos.saturating_sub(1)
        };
        path.push(pos);
    }
    path
}

fn drain_events(rx: &mut EventReceiver, statuses: &mut CacheStatusMap) {
    while let Ok(evt) = rx.try_recv() {
        if !statuses.on_event(&evt) {
            tracing::debug!(rank = evt.rank(), "忽略已逐出条目的完成通知");
        }
    }
}

pub async fn run_session(
    settings: &AppSettings,
    data_dir: &Path,
    total: ItemCount,
    path: &[usize],
) -> Result<SessionReport, AppError> {
    let policy = settings.policy.build()?;
    let cache = SpanCache::open(&data_dir.join("span_cache"), settings.cache_max_bytes());
    let (backend, mut rx_evt) = spawn_preload_worker(cache, settings.worker_config());
    let query = backend.clone();

    let playlist = Playlist::new(settings.base_uri.clone(), total);
    let mut manager = SlidingWindowManager::new(playlist, backend, policy);
    let mut statuses = CacheStatusMap::new();
    let mut report = SessionReport::default();
    let step_delay = Duration::from_millis(settings.load_delay_ms);

    let init = manager.initialize(total, settings.window)?;
    statuses.apply_update(&init);
    report.added += init.added.len();
    report.warnings += init.warnings.len();
    println!("初始窗口: {}", format_window(manager.window()));

    for &index in path {
        let update = match manager.on_current_index_changed(index) {
            Ok(u) => u,
            Err(WindowError::IndexOutOfRange { index, total }) => {
                tracing::warn!(index, total, "索引越界，跳过");
                report.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        statuses.apply_update(&update);
        report.steps += 1;
        report.added += update.added.len();
        report.removed += update.removed.len();
        report.warnings += update.warnings.len();

        tokio::time::sleep(step_delay).await;
        drain_events(&mut rx_evt, &mut statuses);

        if update.is_noop() {
            println!("-> {index:>4}  窗口 {}", format_window(manager.window()));
        } else {
            println!(
                "-> {index:>4}  窗口 {}  +{:?} -{:?}",
                format_window(manager.window()),
                update.added,
                update.removed
            );
        }
    }

    report.fully_cached = statuses.cached_count();
    report.final_window = manager.window().to_vec();

    if let Some(current) = manager.current_index()
        && total.contains(current + 1)
    {
        let next: MediaItem = manager.source().item(current + 1);
        match query.cached_spans(&next.cache_key()).await {
            Ok(spans) => println!("下一条 {next} 已缓存字节段: {spans:?}"),
            Err(e) => tracing::warn!(err = %e, "查询缓存字节段失败"),
        }
    }

    let released = manager.release();
    statuses.apply_update(&released);
    // 等 worker 退出并落盘
    while rx_evt.recv().await.is_some() {}

    println!(
        "步数 {} 跳过 {} 新增 {} 逐出 {} 警告 {} 完整缓存 {}",
        report.steps,
        report.skipped,
        report.added,
        report.removed,
        report.warnings,
        report.fully_cached
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_is_seeded() {
        let a = random_walk(ItemCount::Finite(20), 30, 42);
        let b = random_walk(ItemCount::Finite(20), 30, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
        assert!(a.iter().all(|&i| i < 20));
    }

    #[test]
    fn test_random_walk_single_steps() {
        let path = random_walk(ItemCount::Unbounded, 100, 3);
        let mut prev = 0usize;
        for &i in &path {
            assert!(i.abs_diff(prev) <= 1);
            prev = i;
        }
    }

    #[test]
    fn test_format_window() {
        let mut w = WindowIndexSet::new();
        assert_eq!(format_window(&w), "[]");
        for i in 4..14 {
            w.push_back(i).unwrap();
        }
        assert_eq!(format_window(&w), "[4..=13] (10)");
    }
}
