use std::io::{self, Read, Write};

use tokio::io::AsyncRead;

use super::error::{SyncError, SyncResult};
use super::task::Task;

const BUFFER_SIZE: usize = 32 * 1024;

/// 让 CRC32 计算器可以直接作为 `io::copy` 的写入端
struct Crc32Writer(crc32fast::Hasher);

impl Write for Crc32Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn encode(sum: u32) -> String {
    hex::encode(sum.to_be_bytes())
}

/// 位图未全部完成时返回 `Incomplete`
pub fn ensure_complete(task: &Task) -> SyncResult<()> {
    if !task.is_complete() {
        let file = task.file();
        return Err(SyncError::Incomplete {
            name: file.name.clone(),
            id: file.id,
        });
    }
    Ok(())
}

fn compare(actual: String, task: &Task) -> SyncResult<()> {
    let expected = &task.file().crc32;
    if &actual != expected {
        return Err(SyncError::ChecksumMismatch {
            actual,
            expected: expected.clone(),
        });
    }
    Ok(())
}

/// 读到流结束，返回小写十六进制的 CRC32 (IEEE)
pub fn checksum<R: Read>(mut r: R) -> io::Result<String> {
    let mut writer = Crc32Writer(crc32fast::Hasher::new());
    io::copy(&mut r, &mut writer)?;
    Ok(encode(writer.0.finalize()))
}

pub async fn checksum_async<R: AsyncRead + Unpin>(mut r: R) -> io::Result<String> {
    use tokio::io::AsyncReadExt;

    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; BUFFER_SIZE];
    loop {
        let n = r.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(encode(hasher.finalize()))
}

/// 检查位图是否全部完成，并计算给定内容的 CRC32 与任务的参考值比对
///
/// 位图未完成时直接返回，不会读取 `r`。
pub fn verify<R: Read>(r: R, task: &Task) -> SyncResult<()> {
    ensure_complete(task)?;
    let actual = checksum(r)?;
    compare(actual, task)
}

/// `verify` 的异步版本，用于 tokio 的字节流
pub async fn verify_async<R: AsyncRead + Unpin>(r: R, task: &Task) -> SyncResult<()> {
    ensure_complete(task)?;
    let actual = checksum_async(r).await?;
    compare(actual, task)
}
