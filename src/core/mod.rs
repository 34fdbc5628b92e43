//! Core: 分块下载任务的登记、完成位图和 CRC32 校验
//!
//! 主要包括：
//! - `chunk`: 字节区间分块 `Chunk`
//! - `bitfield`: 分块完成位图接口及 `AtomicBitfield`
//! - `task`: 远端文件描述 `RemoteFile` 与下载任务 `Task`
//! - `registry`: 活跃任务表 `Tasks`
//! - `verify`: 下载完成后的 CRC32 校验
//! - `session`: 串起以上组件的 `SyncSession`
//! - `error`: 错误类型

pub mod bitfield;
pub mod chunk;
pub mod error;
pub mod registry;
pub mod session;
pub mod task;
pub mod verify;

pub use bitfield::{AtomicBitfield, Bitfield};
pub use chunk::Chunk;
pub use error::{SyncError, SyncResult};
pub use registry::Tasks;
pub use session::SyncSession;
pub use task::{RemoteFile, Task, TaskSnapshot};
pub use verify::{verify, verify_async};
