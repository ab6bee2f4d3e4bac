//! 距离 → 预加载强度映射
//!
//! 默认策略 `jump_ready` 是刻意的“反转”：相邻条目马上会被顺序消费，只需浅缓冲；
//! 较远的条目要应对跳转访问，因此完整预缓存。需要“越近越积极”时用 `nearest_first`。

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::PolicyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreloadIntensity {
    None,
    ShallowBuffer { duration_ms: u64 },
    FullyCached { duration_ms: u64 },
}

impl PreloadIntensity {
    fn rank(self) -> (u8, u64) {
        match self {
            PreloadIntensity::None => (0, 0),
            PreloadIntensity::ShallowBuffer { duration_ms } => (1, duration_ms),
            PreloadIntensity::FullyCached { duration_ms } => (2, duration_ms),
        }
    }

    pub fn duration_ms(self) -> u64 {
        self.rank().1
    }

    pub fn is_none(self) -> bool {
        matches!(self, PreloadIntensity::None)
    }
}

// None < ShallowBuffer < FullyCached，同级按时长
impl Ord for PreloadIntensity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for PreloadIntensity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 距离不超过 `max_distance`（且超过上一条规则）时使用 `intensity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceRule {
    pub max_distance: usize,
    pub intensity: PreloadIntensity,
}

impl DistanceRule {
    pub const fn new(max_distance: usize, intensity: PreloadIntensity) -> Self {
        Self {
            max_distance,
            intensity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadPriorityPolicy {
    rules: Vec<DistanceRule>,
    fallback: PreloadIntensity,
    current_index: Option<usize>,
}

impl Default for PreloadPriorityPolicy {
    fn default() -> Self {
        Self::jump_ready()
    }
}

impl PreloadPriorityPolicy {
    pub fn new(rules: Vec<DistanceRule>, fallback: PreloadIntensity) -> Result<Self, PolicyError> {
        for (position, pair) in rules.windows(2).enumerate() {
            if pair[1].max_distance <= pair[0].max_distance {
                return Err(PolicyError::UnorderedRules {
                    position: position + 1,
                    max_distance: pair[1].max_distance,
                });
            }
        }
        Ok(Self {
            rules,
            fallback,
            current_index: None,
        })
    }

    /// 相邻浅缓冲、远处完整缓存
    pub fn jump_ready() -> Self {
        Self {
            rules: vec![
                DistanceRule::new(0, PreloadIntensity::None),
                DistanceRule::new(1, PreloadIntensity::ShallowBuffer { duration_ms: 1000 }),
                DistanceRule::new(3, PreloadIntensity::ShallowBuffer { duration_ms: 500 }),
            ],
            fallback: PreloadIntensity::FullyCached { duration_ms: 3000 },
            current_index: None,
        }
    }

    /// 越近越积极，距离 > 3 不预加载
    pub fn nearest_first() -> Self {
        Self {
            rules: vec![
                DistanceRule::new(0, PreloadIntensity::None),
                DistanceRule::new(1, PreloadIntensity::FullyCached { duration_ms: 3000 }),
                DistanceRule::new(3, PreloadIntensity::ShallowBuffer { duration_ms: 1000 }),
            ],
            fallback: PreloadIntensity::None,
            current_index: None,
        }
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = Some(index);
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// 与当前索引的距离；未设置当前索引时从 0 开始算
    pub fn distance(&self, item_index: usize) -> usize {
        item_index.abs_diff(self.current_index.unwrap_or(0))
    }

    pub fn intensity_for(&self, item_index: usize) -> PreloadIntensity {
        self.intensity_at_distance(self.distance(item_index))
    }

    pub fn intensity_at_distance(&self, distance: usize) -> PreloadIntensity {
        self.rules
            .iter()
            .find(|r| distance <= r.max_distance)
            .map(|r| r.intensity)
            .unwrap_or(self.fallback)
    }

    pub fn rules(&self) -> &[DistanceRule] {
        &self.rules
    }

    pub fn fallback(&self) -> PreloadIntensity {
        self.fallback
    }

    /// 距离 >= 1 时强度是否随距离单调不增（距离 0 是播放器自己的条目，不参与比较）
    pub fn is_monotonic(&self) -> bool {
        let mut levels = self
            .rules
            .iter()
            .filter(|r| r.max_distance >= 1)
            .map(|r| r.intensity)
            .collect::<Vec<_>>();
        levels.push(self.fallback);
        levels.windows(2).all(|w| w[1] <= w[0])
    }
}
