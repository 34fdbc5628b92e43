use chrono::Local; // 用于获取本地时间
use log::{LevelFilter, Log, Metadata, Record};
use std::io::{Write, BufWriter};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::config::Config;
use crate::core::error::SyncResult;

struct LogFile {
    writer: BufWriter<File>,
    current_size: u64,
}

/// 写入文件的日志器，超过大小上限时轮转为 `<path>.backup`
pub struct FileLogger {
    file: Mutex<LogFile>,
    level: LevelFilter,
    file_path: String,
    max_size: u64, // 最大文件大小 (bytes)
}

impl FileLogger {
    /// 创建新的日志器
    pub fn new(file_path: &str, level: LevelFilter, max_size: u64) -> Result<Self, std::io::Error> {
        // 确保日志目录存在
        if let Some(parent) = Path::new(file_path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let current_size = file.metadata()?.len();

        Ok(Self {
            file: Mutex::new(LogFile {
                writer: BufWriter::new(file),
                current_size,
            }),
            level,
            file_path: file_path.to_string(),
            max_size,
        })
    }

    /// 检查并执行日志轮转
    fn check_rotation(&self, state: &mut LogFile) -> Result<(), std::io::Error> {
        if state.current_size > self.max_size {
            state.writer.flush()?;

            let backup_path = format!("{}.backup", self.file_path);
            if Path::new(&backup_path).exists() {
                std::fs::remove_file(&backup_path)?;
            }
            std::fs::rename(&self.file_path, &backup_path)?;

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)?;

            state.writer = BufWriter::new(file);
            state.current_size = 0;
        }
        Ok(())
    }

    fn write_log(&self, record: &Record) -> Result<(), std::io::Error> {
        let log_entry = format!(
            "{} [{}] - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.args()
        );

        let mut state = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        self.check_rotation(&mut state)?;

        state.writer.write_all(log_entry.as_bytes())?;
        state.current_size += log_entry.len() as u64;

        // 定期刷新缓冲区
        if state.current_size % 1024 < log_entry.len() as u64 {
            state.writer.flush()?;
        }
        Ok(())
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Err(e) = self.write_log(record) {
            eprintln!("日志写入失败: {}", e);
        }
    }

    fn flush(&self) {
        let mut state = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = state.writer.flush();
    }
}

/// 安装全局日志器，整个进程只能调用一次
pub fn init(file_path: &str, level: LevelFilter, max_size: u64) -> SyncResult<()> {
    let logger = FileLogger::new(file_path, level, max_size)?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}

pub fn init_from_config(config: &Config) -> SyncResult<()> {
    init(&config.log_file, config.level_filter()?, config.log_max_size)
}
