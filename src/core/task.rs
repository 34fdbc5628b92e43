use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::utils::path::trim_path;
use super::bitfield::{AtomicBitfield, Bitfield};
use super::chunk::{self, Chunk};
use super::error::{SyncError, SyncResult};

/// 远端文件描述，由文件列表接口返回
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: i64,
    pub name: String,
    pub size: u64,
    /// 小写十六进制的 CRC32
    pub crc32: String,
}

/// 单个下载任务：远端文件、目标目录、完成位图和分块列表
#[derive(Debug)]
pub struct Task {
    file: RemoteFile,
    cwd: PathBuf,
    bitfield: Arc<dyn Bitfield>,
    chunks: Vec<Chunk>,
}

/// 任务的可序列化快照，用于诊断输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub size: u64,
    pub chunks: usize,
    pub completed_chunks: usize,
    pub downloaded: u64,
    pub progress: f32,
}

impl Task {
    /// 使用新建的 `AtomicBitfield` 创建任务
    pub fn new(file: RemoteFile, cwd: impl Into<PathBuf>, chunks: Vec<Chunk>) -> SyncResult<Self> {
        let bitfield = Arc::new(AtomicBitfield::new(chunks.len()));
        Self::with_bitfield(file, cwd, chunks, bitfield)
    }

    /// 使用调用方提供的位图创建任务，位图长度必须等于分块数
    pub fn with_bitfield(
        file: RemoteFile,
        cwd: impl Into<PathBuf>,
        chunks: Vec<Chunk>,
        bitfield: Arc<dyn Bitfield>,
    ) -> SyncResult<Self> {
        chunk::validate_layout(&chunks, file.size)?;
        if bitfield.len() != chunks.len() {
            return Err(SyncError::invalid_layout(format!(
                "位图长度 {} 与分块数 {} 不一致",
                bitfield.len(),
                chunks.len()
            )));
        }

        Ok(Self {
            file,
            cwd: cwd.into(),
            bitfield,
            chunks,
        })
    }

    /// 按固定块大小切分并创建任务
    pub fn split(file: RemoteFile, cwd: impl Into<PathBuf>, chunk_size: u64) -> SyncResult<Self> {
        if chunk_size == 0 {
            return Err(SyncError::invalid_layout("分块大小必须大于0"));
        }
        let chunks = chunk::split(file.size, chunk_size);
        Self::new(file, cwd, chunks)
    }

    pub fn file(&self) -> &RemoteFile {
        &self.file
    }

    pub fn id(&self) -> i64 {
        self.file.id
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// 传输层通过位图标记分块完成
    pub fn bitfield(&self) -> &Arc<dyn Bitfield> {
        &self.bitfield
    }

    /// 组装后文件的真实路径
    pub fn dest_path(&self) -> PathBuf {
        self.cwd.join(&self.file.name)
    }

    pub fn is_complete(&self) -> bool {
        self.bitfield.all()
    }

    pub fn completed_chunks(&self) -> usize {
        self.bitfield.count()
    }

    /// 已完成分块的字节数
    pub fn downloaded_bytes(&self) -> u64 {
        self.chunks
            .iter()
            .enumerate()
            .filter(|(i, _)| self.bitfield.test(*i))
            .map(|(_, c)| c.length())
            .sum()
    }

    pub fn progress_percentage(&self) -> f32 {
        if self.file.size == 0 {
            return 0.0;
        }
        (self.downloaded_bytes() as f32 / self.file.size as f32) * 100.0
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.file.id,
            name: self.file.name.clone(),
            path: self.dest_path().to_string_lossy().into_owned(),
            size: self.file.size,
            chunks: self.chunks.len(),
            completed_chunks: self.completed_chunks(),
            downloaded: self.downloaded_bytes(),
            progress: self.progress_percentage(),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chunks = self
            .chunks
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            f,
            "task<name: {:?}, size: {}, chunks: [{}], bitfield: {}>",
            trim_path(&self.dest_path().to_string_lossy()),
            self.file.size,
            chunks,
            self.bitfield.count(),
        )
    }
}
