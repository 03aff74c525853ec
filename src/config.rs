//! src/config.rs

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tokio::fs;

/// 設定檔所在目錄的環境變數覆寫。
pub const HOME_ENV: &str = "ROUNDTABLE_HOME";

const CONFIG_FILE: &str = "config.toml";

/// Returns the configuration directory path (~/.config/roundtable).
pub async fn get_config_dir() -> Result<PathBuf> {
    let config_dir = match env::var(HOME_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ if cfg!(windows) => {
            // Windows: %APPDATA%\roundtable
            dirs::data_dir()
                .map(|p| p.join("roundtable"))
                .context("無法取得資料目錄")?
        }
        _ => {
            // Linux/macOS: ~/.config/roundtable
            dirs::config_dir()
                .map(|p| p.join("roundtable"))
                .context("無法取得設定目錄")?
        }
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .await
            .context("無法建立設定目錄")?;
    }
    Ok(config_dir)
}

/// Represents the user-editable settings of the application.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub discuss: DiscussSettings,
    #[serde(default)]
    pub workflow: WorkflowSettings,
    #[serde(default)]
    pub clipboard: ClipboardSettings,
}

/// 討論紀錄工具的行為設定。
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DiscussSettings {
    /// 建立新主題時的預設根目錄，留空則使用桌面。
    #[serde(default)]
    pub default_root: String,
    /// 送出後自動進入下一輪。
    #[serde(default)]
    pub auto_advance: bool,
    /// 不產生 `第N輪_完整紀錄.txt`。
    #[serde(default)]
    pub no_full_record: bool,
    /// 只產生完整紀錄，不產生個別 `_回覆` 與 `提問.txt`。
    #[serde(default)]
    pub only_full_record: bool,
}

impl DiscussSettings {
    /// 兩個互斥開關同時開啟時會什麼都不輸出，直接回退為正常輸出。
    /// 回傳是否有修正。
    pub fn normalize(&mut self) -> bool {
        if self.no_full_record && self.only_full_record {
            self.no_full_record = false;
            self.only_full_record = false;
            return true;
        }
        false
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkflowSettings {
    /// 開場指令中共用文件資料夾的相對路徑。
    #[serde(default = "default_shared_dir")]
    pub shared_dir: String,
    /// 進入代碼資料夾後要執行的 CLI 指令。
    #[serde(default = "default_cli_command")]
    pub cli_command: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            shared_dir: default_shared_dir(),
            cli_command: default_cli_command(),
        }
    }
}

fn default_shared_dir() -> String {
    "../_共用文件".to_string()
}

fn default_cli_command() -> String {
    "copilot --allow-all".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClipboardSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

async fn config_path() -> Result<PathBuf> {
    Ok(get_config_dir().await?.join(CONFIG_FILE))
}

/// Creates a default configuration file, overwriting any existing one.
pub async fn create_default_config() -> Result<PathBuf> {
    let config_path = config_path().await?;
    save_config(&Config::default()).await?;
    println!(
        "{} {}",
        "✅ 已建立預設設定檔:".green(),
        config_path.display()
    );
    Ok(config_path)
}

pub async fn save_config(config: &Config) -> Result<()> {
    let config_path = config_path().await?;
    let config_content = toml::to_string_pretty(config).context("無法序列化設定")?;
    fs::write(&config_path, config_content)
        .await
        .with_context(|| format!("無法寫入設定檔 {}", config_path.display()))?;
    Ok(())
}

pub async fn load_config() -> Result<Config> {
    let config_path = config_path().await?;

    if !config_path.exists() {
        log::info!("設定檔不存在，建立預設值於 {}", config_path.display());
        save_config(&Config::default()).await?;
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .await
        .context("無法讀取設定檔")?;
    let mut config: Config = toml::from_str(&config_content).context("無法解析設定檔")?;

    if config.discuss.normalize() {
        log::warn!("no_full_record 與 only_full_record 不可同時開啟，已重設為正常輸出");
        save_config(&config).await?;
    }

    Ok(config)
}

/// 新主題的預設建立位置：設定值、桌面、家目錄、目前目錄，依序取第一個可用的。
pub fn default_topic_root(config: &Config) -> PathBuf {
    let configured = crate::paths::normalize_path(&config.discuss.default_root);
    if let Some(root) = configured {
        return root;
    }
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resets_conflicting_switches() {
        let mut settings = DiscussSettings {
            no_full_record: true,
            only_full_record: true,
            ..Default::default()
        };
        assert!(settings.normalize());
        assert!(!settings.no_full_record);
        assert!(!settings.only_full_record);

        let mut settings = DiscussSettings {
            no_full_record: true,
            ..Default::default()
        };
        assert!(!settings.normalize());
        assert!(settings.no_full_record);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("[discuss]\nauto_advance = true\n").unwrap();
        assert!(config.discuss.auto_advance);
        assert_eq!(config.workflow.shared_dir, "../_共用文件");
        assert_eq!(config.workflow.cli_command, "copilot --allow-all");
        assert!(config.clipboard.enabled);
    }

    #[test]
    fn default_config_roundtrips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
