use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use log::LevelFilter;
use crate::core::error::{SyncError, SyncResult};

/// 配置结构体
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 默认下载目录
    pub download_dir: String,
    /// 分块大小（字节）
    pub chunk_size: u64,
    /// 校验时读取文件的缓冲区大小（字节）
    pub verify_buffer_size: usize,
    /// 日志文件路径
    pub log_file: String,
    /// 日志级别：off / error / warn / info / debug / trace
    pub log_level: String,
    /// 日志文件最大大小（字节），超过后轮转
    pub log_max_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: "./downloads".to_string(),
            chunk_size: 4 * 1024 * 1024,
            verify_buffer_size: 64 * 1024,
            log_file: "logs/multisync.log".to_string(),
            log_level: "info".to_string(),
            log_max_size: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// 加载配置文件，不存在时写入默认配置
    pub fn load(path: &str) -> SyncResult<Self> {
        if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            match toml::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    log::warn!("配置文件格式错误: {}，将使用默认配置", e);
                    let config = Config::default();
                    Config::save_with_tutorial(&config, path)?;
                    Ok(config)
                }
            }
        } else {
            let config = Config::default();
            Config::save_with_tutorial(&config, path)?;
            Ok(config)
        }
    }

    /// 保存带说明的配置文件
    pub fn save_with_tutorial(&self, path: &str) -> SyncResult<()> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let config_content = toml::to_string_pretty(self)
            .map_err(|e| SyncError::config_error(format!("无法序列化配置: {}", e)))?;
        let full_content = format!("{}\n{}", Config::generate_tutorial_content(), config_content);
        fs::write(path, full_content)?;
        Ok(())
    }

    fn generate_tutorial_content() -> &'static str {
        r#"# MultiSync 配置文件
# ====================
#
# TOML 格式。删除某一项会使用默认值。
#
# download_dir        下载目录，支持相对路径和绝对路径
# chunk_size          分块大小（字节），每个分块由一个连接下载
# verify_buffer_size  CRC32 校验时的读缓冲区大小（字节）
# log_file            日志文件路径
# log_level           日志级别：off / error / warn / info / debug / trace
# log_max_size        日志文件超过该大小（字节）后轮转为 <log_file>.backup
"#
    }

    /// 校验配置合法性
    pub fn validate(&self) -> SyncResult<()> {
        if self.download_dir.is_empty() {
            return Err(SyncError::config_error("下载目录不能为空"));
        }

        if self.chunk_size == 0 {
            return Err(SyncError::config_error("分块大小必须大于0"));
        }

        if self.verify_buffer_size == 0 {
            return Err(SyncError::config_error("校验缓冲区大小必须大于0"));
        }

        if self.log_max_size == 0 {
            return Err(SyncError::config_error("日志文件大小必须大于0"));
        }

        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> SyncResult<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| SyncError::config_error(format!("无效的日志级别: {}", self.log_level)))
    }

    /// 获取配置摘要信息
    pub fn get_summary(&self) -> String {
        format!(
            "配置摘要:\n\
            - 下载目录: {}\n\
            - 分块大小: {} 字节\n\
            - 校验缓冲区: {} 字节\n\
            - 日志文件: {} ({})",
            self.download_dir,
            self.chunk_size,
            self.verify_buffer_size,
            self.log_file,
            self.log_level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 4 * 1024 * 1024);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.download_dir = String::new();
        assert!(config.validate().is_err());

        config = Config::default();
        config.log_level = "loud".to_string();
        assert!(matches!(config.validate(), Err(SyncError::ConfigError(_))));
    }

    #[test]
    fn test_level_filter() {
        let mut config = Config::default();
        config.log_level = "debug".to_string();
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multisync.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.chunk_size = 1024;
        config.save_with_tutorial(path).expect("保存配置失败");

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("MultiSync 配置文件"));

        let loaded = Config::load(path).expect("加载配置失败");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("multisync.toml");
        let path = path.to_str().unwrap();

        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
        assert!(Path::new(path).exists());
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "chunk_size = 2048\n").unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.chunk_size, 2048);
        assert_eq!(config.download_dir, Config::default().download_dir);
    }

    #[test]
    fn test_config_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "chunk_size = = =").unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_summary() {
        let summary = Config::default().get_summary();
        assert!(summary.contains("配置摘要"));
        assert!(summary.contains("下载目录"));
        assert!(summary.contains("分块大小"));
    }
}
