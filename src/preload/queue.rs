//! 进程内的预加载排队器
//!
//! 按与当前索引的距离排序，一次只推进队首条目；队首完成后才轮到下一个。

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use crate::error::PreloadError;

use super::policy::{PreloadIntensity, PreloadPriorityPolicy};
use super::traits::PreloadBackend;

#[derive(Debug, Clone)]
pub struct PreloadTask<I> {
    pub item: I,
    pub rank: usize,
    pub intensity: PreloadIntensity,
    distance: usize,
}

impl<I> Ord for PreloadTask<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        // 距离近的先出堆；同距离时索引小的先出
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

impl<I> PartialOrd for PreloadTask<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I> PartialEq for PreloadTask<I> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.rank == other.rank
    }
}

impl<I> Eq for PreloadTask<I> {}

#[derive(Debug)]
pub struct PreloadQueue<I> {
    ranks: HashMap<I, usize>,
    pending: BinaryHeap<PreloadTask<I>>,
}

impl<I> Default for PreloadQueue<I> {
    fn default() -> Self {
        Self {
            ranks: HashMap::new(),
            pending: BinaryHeap::new(),
        }
    }
}

impl<I> PreloadQueue<I>
where
    I: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn contains(&self, item: &I) -> bool {
        self.ranks.contains_key(item)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn add(&mut self, item: I, rank: usize) {
        self.ranks.insert(item, rank);
    }

    pub fn remove(&mut self, item: &I) -> bool {
        if self.ranks.remove(item).is_none() {
            return false;
        }
        self.pending.retain(|t| &t.item != item);
        true
    }

    /// 丢弃当前进度，按新的优先级重新排队
    pub fn invalidate(&mut self, policy: &PreloadPriorityPolicy) {
        self.pending.clear();
        for (item, &rank) in &self.ranks {
            let intensity = policy.intensity_for(rank);
            if intensity.is_none() {
                continue;
            }
            self.pending.push(PreloadTask {
                item: item.clone(),
                rank,
                intensity,
                distance: policy.distance(rank),
            });
        }
    }

    pub fn next_task(&self) -> Option<&PreloadTask<I>> {
        self.pending.peek()
    }

    /// 队首完成；不是队首的完成通知直接忽略
    pub fn complete(&mut self, item: &I) -> Option<PreloadTask<I>> {
        if self.pending.peek().is_some_and(|t| &t.item == item) {
            self.pending.pop()
        } else {
            None
        }
    }

    pub fn release(&mut self) {
        self.ranks.clear();
        self.pending.clear();
    }
}

impl<I> PreloadBackend<I> for PreloadQueue<I>
where
    I: Clone + Eq + Hash,
{
    fn add(&mut self, item: I, rank: usize) -> Result<(), PreloadError> {
        PreloadQueue::add(self, item, rank);
        Ok(())
    }

    fn remove(&mut self, item: &I) -> Result<(), PreloadError> {
        PreloadQueue::remove(self, item);
        Ok(())
    }

    fn invalidate(&mut self, policy: &PreloadPriorityPolicy) -> Result<(), PreloadError> {
        PreloadQueue::invalidate(self, policy);
        Ok(())
    }

    fn release(&mut self) {
        PreloadQueue::release(self);
    }
}
