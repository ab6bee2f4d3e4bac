use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::CacheError;
use crate::preload::CachedRangeQuery;

const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Default)]
struct SpanIndex {
    #[serde(default)]
    version: u32,
    entries: HashMap<String, CachedContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CachedContent {
    /// 按 position 排序、互不相交也不相邻
    spans: Vec<CacheSpan>,
    last_access: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CacheSpan {
    position: u64,
    length: u64,
}

impl CacheSpan {
    fn end(&self) -> u64 {
        self.position.saturating_add(self.length)
    }
}

impl CachedContent {
    fn cached_bytes(&self) -> u64 {
        self.spans.iter().map(|s| s.length).sum()
    }

    fn insert(&mut self, span: CacheSpan) {
        self.spans.push(span);
        self.spans.sort_by_key(|s| s.position);

        let mut merged: Vec<CacheSpan> = Vec::with_capacity(self.spans.len());
        for s in self.spans.drain(..) {
            match merged.last_mut() {
                Some(last) if s.position <= last.end() => {
                    let end = last.end().max(s.end());
                    last.length = end - last.position;
                }
                _ => merged.push(s),
            }
        }
        self.spans = merged;
    }
}

/// 按 key 记录已缓存字节段的 LRU 缓存索引
pub struct SpanCache {
    index_path: Option<PathBuf>,
    index: SpanIndex,
    max_bytes: u64,
    access_seq: u64,
}

impl SpanCache {
    pub fn in_memory(max_bytes: u64) -> Self {
        Self {
            index_path: None,
            index: SpanIndex {
                version: INDEX_VERSION,
                entries: HashMap::new(),
            },
            max_bytes,
            access_seq: 0,
        }
    }

    /// 索引保存在 `dir/index.json`；目录不可用时退化为纯内存
    pub fn open(dir: &Path, max_bytes: u64) -> Self {
        if let Err(e) = fs::create_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), err = %e, "创建缓存目录失败，缓存索引不落盘");
            return Self::in_memory(max_bytes);
        }

        let index_path = dir.join("index.json");
        let index = fs::read(&index_path)
            .ok()
            .and_then(|b| serde_json::from_slice::<SpanIndex>(&b).ok())
            .filter(|idx| idx.version == INDEX_VERSION)
            .unwrap_or_else(|| SpanIndex {
                version: INDEX_VERSION,
                entries: HashMap::new(),
            });
        let access_seq = index
            .entries
            .values()
            .map(|c| c.last_access)
            .max()
            .unwrap_or(0);

        tracing::debug!(path = %index_path.display(), keys = index.entries.len(), "缓存索引已加载");
        Self {
            index_path: Some(index_path),
            index,
            max_bytes,
            access_seq,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn total_bytes(&self) -> u64 {
        self.index.entries.values().map(|c| c.cached_bytes()).sum()
    }

    pub fn key_count(&self) -> usize {
        self.index.entries.len()
    }

    pub fn add_span(&mut self, key: &str, position: u64, length: u64) -> Result<(), CacheError> {
        if length == 0 {
            return Ok(());
        }

        // 以合并后的大小检查预算
        let mut content = self.index.entries.get(key).cloned().unwrap_or_default();
        content.insert(CacheSpan { position, length });
        let merged = content.cached_bytes();
        if merged > self.max_bytes {
            return Err(CacheError::SizeLimit {
                requested: merged,
                limit: self.max_bytes,
            });
        }

        content.last_access = self.next_seq();
        self.index.entries.insert(key.to_owned(), content);
        self.evict(key);

        if let Err(e) = self.persist() {
            tracing::warn!(key = %key, err = %e, "保存缓存索引失败");
        }
        Ok(())
    }

    pub fn cached_spans(&mut self, key: &str) -> Vec<Range<u64>> {
        let seq = self.next_seq();
        let Some(content) = self.index.entries.get_mut(key) else {
            return Vec::new();
        };
        content.last_access = seq;
        content.spans.iter().map(|s| s.position..s.end()).collect()
    }

    /// 从 position 开始连续缓存的字节数，最多 max_len
    pub fn cached_length(&self, key: &str, position: u64, max_len: u64) -> u64 {
        self.index
            .entries
            .get(key)
            .and_then(|c| {
                c.spans
                    .iter()
                    .find(|s| s.position <= position && position < s.end())
            })
            .map(|s| (s.end() - position).min(max_len))
            .unwrap_or(0)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.index.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) -> (usize, u64) {
        let keys = self.key_count();
        let bytes = self.total_bytes();
        self.index.entries.clear();
        (keys, bytes)
    }

    pub fn persist(&self) -> Result<(), CacheError> {
        let Some(index_path) = self.index_path.as_ref() else {
            return Ok(());
        };
        let dir = index_path.parent().unwrap_or_else(|| Path::new("."));
        let bytes = serde_json::to_vec_pretty(&self.index)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(index_path).map_err(|e| CacheError::FileOp(e.error))?;
        Ok(())
    }

    fn next_seq(&mut self) -> u64 {
        self.access_seq = self.access_seq.wrapping_add(1);
        self.access_seq
    }

    fn evict(&mut self, keep: &str) {
        let mut total = self.total_bytes();
        if total <= self.max_bytes {
            return;
        }

        let mut entries = self
            .index
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() != keep)
            .map(|(k, c)| (k.to_owned(), c.last_access, c.cached_bytes()))
            .collect::<Vec<_>>();
        entries.sort_by_key(|(_, seq, _)| *seq);

        for (key, _seq, size) in entries {
            if total <= self.max_bytes {
                break;
            }
            self.index.entries.remove(&key);
            total = total.saturating_sub(size);
            tracing::debug!(key = %key, bytes = size, "LRU 逐出缓存");
        }
    }
}

impl CachedRangeQuery for SpanCache {
    fn cached_spans(&mut self, key: &str) -> Vec<Range<u64>> {
        SpanCache::cached_spans(self, key)
    }
}
