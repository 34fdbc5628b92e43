use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 分块完成情况的位图能力接口
///
/// 传输层的多个下载线程会并发调用 `set`，校验方会同时查询 `all`，
/// 所以实现必须可以在 `&self` 上安全并发访问。
pub trait Bitfield: Send + Sync + fmt::Debug {
    /// 位置 `index` 是否已完成
    fn test(&self, index: usize) -> bool;

    /// 标记位置 `index` 已完成
    fn set(&self, index: usize);

    /// 是否所有位置都已完成
    fn all(&self) -> bool;

    /// 已完成的位置数
    fn count(&self) -> usize;

    /// 位置总数
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const WORD_BITS: usize = 64;

/// 基于 `AtomicU64` 的无锁位图
#[derive(Debug)]
pub struct AtomicBitfield {
    words: Vec<AtomicU64>,
    length: usize,
}

impl AtomicBitfield {
    pub fn new(length: usize) -> Self {
        let word_len = (length + WORD_BITS - 1) / WORD_BITS;
        Self {
            words: (0..word_len).map(|_| AtomicU64::new(0)).collect(),
            length,
        }
    }

    fn locate(&self, index: usize) -> (usize, u64) {
        assert!(index < self.length, "index out of range");
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }

    /// 第 `word` 个字中有效位的掩码
    fn word_mask(&self, word: usize) -> u64 {
        let bits = std::cmp::min(WORD_BITS, self.length - word * WORD_BITS);
        if bits == WORD_BITS {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        }
    }
}

impl Bitfield for AtomicBitfield {
    /// # Panics
    ///
    /// `index >= len()` 时 panic
    fn test(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        self.words[word].load(Ordering::Acquire) & mask != 0
    }

    /// # Panics
    ///
    /// `index >= len()` 时 panic
    fn set(&self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word].fetch_or(mask, Ordering::AcqRel);
    }

    fn all(&self) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(i, w)| w.load(Ordering::Acquire) == self.word_mask(i))
    }

    fn count(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Acquire).count_ones() as usize)
            .sum()
    }

    fn len(&self) -> usize {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_set_and_test() {
        let bf = AtomicBitfield::new(3);
        assert!(!bf.test(1));
        bf.set(1);
        assert!(bf.test(1));
        assert_eq!(bf.count(), 1);
        assert!(!bf.all());

        // 重复标记不改变计数
        bf.set(1);
        assert_eq!(bf.count(), 1);

        bf.set(0);
        bf.set(2);
        assert!(bf.all());
        assert_eq!(bf.count(), 3);
    }

    #[test]
    fn test_word_boundaries() {
        let bf = AtomicBitfield::new(130);
        for i in 0..129 {
            bf.set(i);
        }
        assert!(!bf.all());
        bf.set(129);
        assert!(bf.all());
        assert_eq!(bf.count(), 130);
    }

    #[test]
    fn test_empty_bitfield_is_complete() {
        let bf = AtomicBitfield::new(0);
        assert!(bf.is_empty());
        assert!(bf.all());
        assert_eq!(bf.count(), 0);
    }

    #[test]
    #[should_panic(expected = "index out of range")]
    fn test_set_out_of_range() {
        AtomicBitfield::new(2).set(2);
    }

    #[test]
    fn test_concurrent_set() {
        let bf = Arc::new(AtomicBitfield::new(256));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let bf = Arc::clone(&bf);
                thread::spawn(move || {
                    for i in (t..256).step_by(8) {
                        bf.set(i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(bf.all());
        assert_eq!(bf.count(), 256);
    }
}
