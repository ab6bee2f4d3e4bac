use serde::{Deserialize, Serialize};
use std::fmt;

use crate::preload::ItemSource;
use crate::window::ItemCount;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaItem {
    pub index: usize,
    pub id: u64,
    pub uri: String,
}

impl MediaItem {
    /// 字节段缓存里使用的 key
    pub fn cache_key(&self) -> String {
        format!("media_{}", self.id)
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.uri)
    }
}

/// 按索引合成条目的短视频列表
#[derive(Debug, Clone)]
pub struct Playlist {
    base_uri: String,
    count: ItemCount,
}

impl Playlist {
    pub fn new(base_uri: impl Into<String>, count: ItemCount) -> Self {
        let base_uri: String = base_uri.into();
        Self {
            base_uri: base_uri.trim_end_matches('/').to_owned(),
            count,
        }
    }
}

impl ItemSource for Playlist {
    type Item = MediaItem;

    fn item(&self, index: usize) -> MediaItem {
        MediaItem {
            index,
            id: index as u64,
            uri: format!("{}/{index}.mp4", self.base_uri),
        }
    }

    fn item_count(&self) -> ItemCount {
        self.count
    }
}
