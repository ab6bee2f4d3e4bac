use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PolicyError;
use crate::preload::{DistanceRule, PreloadIntensity, PreloadPriorityPolicy, WorkerConfig};
use crate::window::WindowConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    // 窗口设置
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub policy: PolicySettings,

    // 缓存/预加载设置
    #[serde(default = "default_cache_max_mb")]
    pub cache_max_mb: u64,
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,
    #[serde(default = "default_bytes_per_second")]
    pub bytes_per_second: u64,
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            policy: PolicySettings::default(),
            cache_max_mb: default_cache_max_mb(),
            load_delay_ms: default_load_delay_ms(),
            bytes_per_second: default_bytes_per_second(),
            base_uri: default_base_uri(),
        }
    }
}

// 默认值函数（用于 serde default）
fn default_cache_max_mb() -> u64 { 512 }
fn default_load_delay_ms() -> u64 { 50 }
fn default_bytes_per_second() -> u64 { 250_000 }
fn default_base_uri() -> String { "https://cdn.example.com/feed".to_owned() }

impl AppSettings {
    pub fn cache_max_bytes(&self) -> u64 {
        self.cache_max_mb.saturating_mul(1024).saturating_mul(1024)
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            load_delay_ms: self.load_delay_ms,
            bytes_per_second: self.bytes_per_second,
        }
    }
}

/// 预加载策略：按距离升序的规则 + 兜底强度
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySettings {
    pub rules: Vec<DistanceRule>,
    pub fallback: PreloadIntensity,
}

impl Default for PolicySettings {
    fn default() -> Self {
        let policy = PreloadPriorityPolicy::jump_ready();
        Self {
            rules: policy.rules().to_vec(),
            fallback: policy.fallback(),
        }
    }
}

impl PolicySettings {
    pub fn build(&self) -> Result<PreloadPriorityPolicy, PolicyError> {
        PreloadPriorityPolicy::new(self.rules.clone(), self.fallback)
    }
}

pub fn load_settings(data_dir: &Path) -> AppSettings {
    let p = settings_path(data_dir);
    let Ok(bytes) = fs::read(&p) else {
        return AppSettings::default();
    };
    match serde_json::from_slice(&bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %p.display(), err = %e, "设置文件解析失败，使用默认设置");
            AppSettings::default()
        }
    }
}

pub fn save_settings(data_dir: &Path, s: &AppSettings) -> std::io::Result<()> {
    fs::create_dir_all(data_dir)?;
    let p = settings_path(data_dir);
    let tmp = p.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(s).unwrap_or_else(|_| b"{}".to_vec());
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, &p) {
        let _ = fs::remove_file(&p);
        fs::rename(&tmp, &p).map_err(|_| e)?;
    }
    Ok(())
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}
