use std::fs::File;
use std::io::{BufReader, Read};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::AsyncRead;

use crate::config::Config;
use crate::utils::path::trim_path;
use super::error::SyncResult;
use super::registry::Tasks;
use super::task::{RemoteFile, Task};
use super::verify::{ensure_complete, verify, verify_async};

/// 一次同步会话：规划任务、登记、校验并从表中移除
pub struct SyncSession {
    config: Config,
    tasks: Tasks,
}

impl SyncSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tasks: Tasks::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tasks(&self) -> &Tasks {
        &self.tasks
    }

    /// 按配置的下载目录和块大小切分远端文件
    pub fn plan(&self, file: RemoteFile) -> SyncResult<Task> {
        Task::split(file, &self.config.download_dir, self.config.chunk_size)
    }

    /// 登记任务，交给传输层开始下载
    pub fn start(&self, task: Task) -> Arc<Task> {
        let task = Arc::new(task);
        if let Some(replaced) = self.tasks.add(Arc::clone(&task)) {
            warn!("任务已存在，已被覆盖: {}", replaced);
        }
        info!("开始下载: {}", task);
        task
    }

    /// 位图未完成时返回 `Incomplete`，任务保留在表中；
    /// 否则先从表中移除再校验，保证同一任务最多校验一次
    pub fn finish<R: Read>(&self, task: &Task, r: R) -> SyncResult<()> {
        ensure_complete(task)?;
        self.tasks.remove(task);
        let result = verify(r, task);
        self.report(task, &result);
        result
    }

    pub async fn finish_async<R: AsyncRead + Unpin>(&self, task: &Task, r: R) -> SyncResult<()> {
        ensure_complete(task)?;
        self.tasks.remove(task);
        let result = verify_async(r, task).await;
        self.report(task, &result);
        result
    }

    /// 打开已组装好的目标文件并校验；位图未完成时不会打开文件
    ///
    /// 打开失败时任务仍保留在表中，由调用方决定重试还是放弃。
    pub fn finish_file(&self, task: &Task) -> SyncResult<()> {
        ensure_complete(task)?;
        let path = task.dest_path();
        debug!("打开文件校验: {}", trim_path(&path.to_string_lossy()));
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!("无法打开文件 {}: {}", trim_path(&path.to_string_lossy()), e);
                return Err(e.into());
            }
        };
        let reader = BufReader::with_capacity(self.config.verify_buffer_size, file);
        self.finish(task, reader)
    }

    /// 放弃任务，不做校验
    pub fn abandon(&self, task: &Task) {
        self.tasks.remove(task);
        info!("放弃下载: {}", task);
    }

    /// 所有任务都已结束
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    fn report(&self, task: &Task, result: &SyncResult<()>) {
        match result {
            Ok(()) => info!("下载完成: {}", task),
            Err(e) => warn!("校验失败: {} - {}", task, e),
        }
    }
}
