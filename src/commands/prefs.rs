use anyhow::Result;
use colored::Colorize;

use crate::config::{self, Config};

fn on_off(value: bool) -> colored::ColoredString {
    if value {
        "開".green()
    } else {
        "關".dimmed()
    }
}

fn print_prefs(config: &Config) {
    let root = match config.discuss.default_root.trim() {
        "" => format!("（未設定，使用 {}）", config::default_topic_root(config).display()),
        root => root.to_string(),
    };
    println!("{}", "討論紀錄".bold());
    println!("  新主題預設位置:       {root}");
    println!("  送出後自動進入下一輪: {}", on_off(config.discuss.auto_advance));
    println!("  不產生完整紀錄:       {}", on_off(config.discuss.no_full_record));
    println!("  只產生完整紀錄:       {}", on_off(config.discuss.only_full_record));
    println!("{}", "協作流程".bold());
    println!("  共用文件路徑:         {}", config.workflow.shared_dir);
    println!("  AI CLI 指令:          {}", config.workflow.cli_command);
    println!("{}", "剪貼簿".bold());
    println!("  使用系統剪貼簿:       {}", on_off(config.clipboard.enabled));
}

pub async fn handle_prefs(
    auto_advance: Option<bool>,
    no_full_record: Option<bool>,
    only_full_record: Option<bool>,
    default_root: Option<String>,
    clipboard: Option<bool>,
) -> Result<()> {
    let mut config = config::load_config().await?;
    let touched = auto_advance.is_some()
        || no_full_record.is_some()
        || only_full_record.is_some()
        || default_root.is_some()
        || clipboard.is_some();

    if !touched {
        print_prefs(&config);
        return Ok(());
    }

    if let Some(v) = auto_advance {
        config.discuss.auto_advance = v;
    }
    // 兩個輸出開關互斥，開啟其中一個時關閉另一個
    if let Some(v) = no_full_record {
        config.discuss.no_full_record = v;
        if v {
            config.discuss.only_full_record = false;
        }
    }
    if let Some(v) = only_full_record {
        config.discuss.only_full_record = v;
        if v {
            config.discuss.no_full_record = false;
        }
    }
    if let Some(root) = default_root {
        config.discuss.default_root = root.trim().to_string();
    }
    if let Some(v) = clipboard {
        config.clipboard.enabled = v;
    }

    config::save_config(&config).await?;
    println!("{}", "✅ 設定已儲存".green());
    print_prefs(&config);
    Ok(())
}
