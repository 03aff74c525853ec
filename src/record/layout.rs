use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

lazy_static! {
    static ref ROUND_DIR: Regex = Regex::new(r"^第(\d+)輪$").unwrap();
}

pub const QUESTION_FILE: &str = "提問.txt";
pub const CUMULATIVE_FILE: &str = "全部討論紀錄（累積）.txt";
pub const MEMBERS_FILE: &str = "AI成員資料.txt";

/// 章節導航一次顯示的輪數。
const CHAPTER_WINDOW: u32 = 5;

pub fn round_dir_name(round: u32) -> String {
    format!("第{round}輪")
}

pub fn round_dir(topic_dir: &Path, round: u32) -> PathBuf {
    topic_dir.join(round_dir_name(round))
}

pub fn reply_file_name(member: &str) -> String {
    format!("{member}_回覆.txt")
}

pub fn full_record_file_name(round: u32) -> String {
    format!("{}_完整紀錄.txt", round_dir_name(round))
}

pub fn full_record_path(topic_dir: &Path, round: u32) -> PathBuf {
    round_dir(topic_dir, round).join(full_record_file_name(round))
}

pub fn cumulative_path(topic_dir: &Path) -> PathBuf {
    topic_dir.join(CUMULATIVE_FILE)
}

/// Parse a folder name such as `第12輪` into its round number.
pub fn parse_round_dir(name: &str) -> Option<u32> {
    ROUND_DIR
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// All round numbers present under `topic_dir`, ascending. Only directories
/// count; a missing topic folder has no rounds.
pub async fn list_rounds(topic_dir: &Path) -> Result<Vec<u32>> {
    if !topic_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut rounds = Vec::new();
    let mut entries = fs::read_dir(topic_dir)
        .await
        .with_context(|| format!("無法讀取主題資料夾 {}", topic_dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let Some(round) = entry.file_name().to_str().and_then(parse_round_dir) else {
            continue;
        };
        match entry.file_type().await {
            Ok(ft) if ft.is_dir() => rounds.push(round),
            Ok(_) => {}
            Err(e) => log::debug!("略過無法讀取的項目 {:?}: {}", entry.path(), e),
        }
    }
    rounds.sort_unstable();
    rounds.dedup();
    Ok(rounds)
}

/// The highest round number under `topic_dir`, or 0 when there is none.
pub async fn scan_max_round(topic_dir: &Path) -> Result<u32> {
    Ok(list_rounds(topic_dir).await?.last().copied().unwrap_or(0))
}

/// Up to five round numbers around `current`, used for quick path insertion.
pub fn chapter_window(current: u32, max_round: u32) -> Vec<u32> {
    let total = current.max(max_round);
    if total == 0 {
        return Vec::new();
    }
    let half = CHAPTER_WINDOW / 2;
    let start = current.saturating_sub(half).max(1);
    let end = total.min(start + CHAPTER_WINDOW - 1);
    let start = end.saturating_sub(CHAPTER_WINDOW - 1).max(1);
    (start..=end).collect()
}
