use serde::{Deserialize, Serialize};

use crate::error::WindowError;

/// 条目总数：有限列表或无限滚动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCount {
    Finite(usize),
    Unbounded,
}

impl ItemCount {
    /// index 是否落在 `[0, total)` 内
    pub fn contains(self, index: usize) -> bool {
        match self {
            ItemCount::Finite(n) => index < n,
            ItemCount::Unbounded => true,
        }
    }

    /// 把 n 截断到条目总数
    pub fn cap(self, n: usize) -> usize {
        match self {
            ItemCount::Finite(total) => n.min(total),
            ItemCount::Unbounded => n,
        }
    }

    pub fn finite(self) -> Option<usize> {
        match self {
            ItemCount::Finite(n) => Some(n),
            ItemCount::Unbounded => None,
        }
    }
}

/// 窗口参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口容量
    #[serde(default = "default_target_window_size")]
    pub target_window_size: usize,
    /// 距窗口边缘多近时触发平移
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: usize,
    /// 每次平移增删的条目数
    #[serde(default = "default_shift_batch_size")]
    pub shift_batch_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            target_window_size: default_target_window_size(),
            edge_threshold: default_edge_threshold(),
            shift_batch_size: default_shift_batch_size(),
        }
    }
}

fn default_target_window_size() -> usize { 10 }
fn default_edge_threshold() -> usize { 2 }
fn default_shift_batch_size() -> usize { 4 }

impl WindowConfig {
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.target_window_size == 0 {
            return Err(WindowError::InvalidConfig(
                "target_window_size 必须大于 0".to_owned(),
            ));
        }
        if self.shift_batch_size == 0 {
            return Err(WindowError::InvalidConfig(
                "shift_batch_size 必须大于 0".to_owned(),
            ));
        }
        Ok(())
    }
}
