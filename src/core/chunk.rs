use std::fmt;

use super::error::{SyncError, SyncResult};

/// 文件分块：一个文件可以被切成若干块，通过多个连接并行下载，
/// 每个连接负责其中一块。覆盖区间为 `[offset, offset + length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    offset: u64,
    length: u64,
}

impl Chunk {
    /// `length` 应大于0；零长度的块会在 `validate_layout` 中被拒绝
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// 块起始位置
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// 块长度
    pub fn length(&self) -> u64 {
        self.length
    }

    /// 块结束位置（不含），溢出时取 `u64::MAX`
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk{{{}-{}}}", self.offset, self.end())
    }
}

/// 按固定块大小切分文件，最后一块可能较短
pub fn split(total_size: u64, chunk_size: u64) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    if chunk_size == 0 {
        return chunks;
    }

    let mut offset = 0;
    while offset < total_size {
        let length = std::cmp::min(chunk_size, total_size - offset);
        chunks.push(Chunk::new(offset, length));
        offset += length;
    }
    chunks
}

/// 检查分块是否从 0 开始连续覆盖整个文件，没有空洞或重叠
pub fn validate_layout(chunks: &[Chunk], total_size: u64) -> SyncResult<()> {
    let mut expected_offset = 0u64;
    for chunk in chunks {
        if chunk.length == 0 {
            return Err(SyncError::invalid_layout(format!("{} 长度为0", chunk)));
        }
        if chunk.offset != expected_offset {
            return Err(SyncError::invalid_layout(format!(
                "{} 应从 {} 开始",
                chunk, expected_offset
            )));
        }
        expected_offset = chunk.offset.checked_add(chunk.length).ok_or_else(|| {
            SyncError::invalid_layout(format!(
                "分块 offset {} + length {} 超出范围",
                chunk.offset, chunk.length
            ))
        })?;
    }

    if expected_offset != total_size {
        return Err(SyncError::invalid_layout(format!(
            "分块总长度 {} 与文件大小 {} 不一致",
            expected_offset, total_size
        )));
    }
    Ok(())
}
