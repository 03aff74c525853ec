use crate::config;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn handle_init() -> Result<()> {
    let path = config::create_default_config()
        .await
        .context("無法初始化設定。")?;
    let dir = config::get_config_dir().await?;
    println!("主題與專案資料會存放在 {}", dir.display().to_string().cyan());
    log::debug!("設定檔位置: {}", path.display());
    Ok(())
}
