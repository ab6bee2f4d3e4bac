//! 窗口内保留的条目索引（严格递增、两端 O(1)）

use std::collections::VecDeque;

use crate::error::IndexSetError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowIndexSet {
    entries: VecDeque<usize>,
}

impl WindowIndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// 追加为新的最右端，要求 index 大于当前最右端
    pub fn push_back(&mut self, index: usize) -> Result<(), IndexSetError> {
        if let Some(&bound) = self.entries.back()
            && index <= bound
        {
            return Err(IndexSetError::OrderViolation { index, bound });
        }
        self.entries.push_back(index);
        Ok(())
    }

    /// 插入为新的最左端，要求 index 小于当前最左端
    pub fn push_front(&mut self, index: usize) -> Result<(), IndexSetError> {
        if let Some(&bound) = self.entries.front()
            && index >= bound
        {
            return Err(IndexSetError::OrderViolation { index, bound });
        }
        self.entries.push_front(index);
        Ok(())
    }

    pub fn pop_back(&mut self) -> Result<usize, IndexSetError> {
        self.entries.pop_back().ok_or(IndexSetError::Empty)
    }

    pub fn pop_front(&mut self) -> Result<usize, IndexSetError> {
        self.entries.pop_front().ok_or(IndexSetError::Empty)
    }

    pub fn leftmost(&self) -> Result<usize, IndexSetError> {
        self.entries.front().copied().ok_or(IndexSetError::Empty)
    }

    pub fn rightmost(&self) -> Result<usize, IndexSetError> {
        self.entries.back().copied().ok_or(IndexSetError::Empty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.binary_search(&index).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.entries.iter().copied().collect()
    }
}
