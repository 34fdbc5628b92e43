//! MultiSync: 多连接分块下载的任务跟踪与完整性校验
//!
//! 文件被切成若干 `Chunk` 由多个连接并行下载，每个 `Task` 用位图记录
//! 分块完成情况，全部完成后用 CRC32 与远端给出的校验值比对。
//! 网络传输、文件组装和文件列表接口都由调用方提供。

pub mod config;
pub mod core;
pub mod utils;

pub use crate::config::Config;
pub use crate::core::{
    AtomicBitfield, Bitfield, Chunk, RemoteFile, SyncError, SyncResult, SyncSession, Task,
    TaskSnapshot, Tasks,
};
