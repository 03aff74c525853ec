//! On-disk layout of a discussion topic.
//!
//! ```text
//! <topic>/
//!   AI成員資料.txt
//!   全部討論紀錄（累積）.txt
//!   第1輪/
//!     提問.txt
//!     <member>_回覆.txt
//!     第1輪_完整紀錄.txt
//!   第2輪/
//!     ...
//! ```
//!
//! Every write overwrites the target file. Nothing here locks or merges.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod layout;
pub mod round;

pub use layout::{chapter_window, list_rounds, round_dir, round_dir_name, scan_max_round};
pub use round::{
    previous_round_summary, read_round, write_round, OutputMode, RoundContext, RoundDraft,
    SavedRound,
};

use crate::state::Member;

/// 空白回覆寫入檔案時的佔位文字。
pub const UNFILLED: &str = "（未填寫）";

pub(crate) fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn render_cumulative_header(topic_name: &str, members: &[Member], time: &str) -> Vec<String> {
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    vec![
        format!("主題：{}  —  全部討論累積紀錄", topic_name.trim()),
        format!("更新時間：{time}"),
        format!("AI 成員：{}", names.join(", ")),
        "=".repeat(60),
        String::new(),
    ]
}

/// Concatenate every round's full record into the cumulative file. Rounds
/// without a full record are skipped.
pub async fn rebuild_cumulative(
    topic_dir: &Path,
    topic_name: &str,
    members: &[Member],
) -> Result<PathBuf> {
    let max_round = scan_max_round(topic_dir).await?;
    let mut lines = render_cumulative_header(topic_name, members, &timestamp());

    for round in 1..=max_round {
        let path = layout::full_record_path(topic_dir, round);
        if !path.exists() {
            log::debug!("第{round}輪沒有完整紀錄，略過");
            continue;
        }
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("無法讀取 {}", path.display()))?;
        lines.push(content);
        lines.push("\n".to_string());
    }

    let out = layout::cumulative_path(topic_dir);
    fs::write(&out, lines.join("\n"))
        .await
        .with_context(|| format!("無法寫入累積紀錄 {}", out.display()))?;
    Ok(out)
}

pub fn render_members_file(topic_name: &str, members: &[Member], time: &str) -> String {
    let mut out = format!("主題：{topic_name}\n更新時間：{time}\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
    for member in members {
        out.push_str(&format!("AI 名稱：{}\n", member.name));
        if let Some(path) = member.path() {
            out.push_str(&format!("工作資料夾：{path}\n"));
        }
        out.push_str(&"-".repeat(30));
        out.push('\n');
    }
    out
}

/// Rewrite `AI成員資料.txt` in the topic folder.
pub async fn write_members_file(
    topic_dir: &Path,
    topic_name: &str,
    members: &[Member],
) -> Result<PathBuf> {
    fs::create_dir_all(topic_dir)
        .await
        .with_context(|| format!("無法建立主題資料夾 {}", topic_dir.display()))?;
    let path = topic_dir.join(layout::MEMBERS_FILE);
    fs::write(&path, render_members_file(topic_name, members, &timestamp()))
        .await
        .with_context(|| format!("無法寫入 {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<Member> {
        vec![Member::new("A", "/a"), Member::new("B", "")]
    }

    #[test]
    fn members_file_layout() {
        let text = render_members_file("主題一", &members(), "2024-01-01 00:00:00");
        let expected = format!(
            "主題：主題一\n更新時間：2024-01-01 00:00:00\n{}\n\nAI 名稱：A\n工作資料夾：/a\n{}\nAI 名稱：B\n{}\n",
            "=".repeat(50),
            "-".repeat(30),
            "-".repeat(30)
        );
        assert_eq!(text, expected);
    }

    #[tokio::test]
    async fn cumulative_concatenates_full_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let topic = dir.path();
        for (round, body) in [(1, "ROUND-ONE"), (2, ""), (3, "ROUND-THREE")] {
            let folder = round_dir(topic, round);
            std::fs::create_dir_all(&folder).unwrap();
            if !body.is_empty() {
                std::fs::write(layout::full_record_path(topic, round), body).unwrap();
            }
        }

        let out = rebuild_cumulative(topic, "討論", &members()).await.unwrap();
        let text = std::fs::read_to_string(out).unwrap();

        assert!(text.starts_with("主題：討論  —  全部討論累積紀錄\n更新時間："));
        assert!(text.contains("AI 成員：A, B\n"));
        let one = text.find("ROUND-ONE").unwrap();
        let three = text.find("ROUND-THREE").unwrap();
        assert!(one < three);
        assert!(text.contains("ROUND-ONE\n\n\nROUND-THREE"));
        assert!(text.ends_with("ROUND-THREE\n\n"));
    }

    #[tokio::test]
    async fn cumulative_for_empty_topic_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = rebuild_cumulative(dir.path(), "空", &[]).await.unwrap();
        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.ends_with(&format!("{}\n", "=".repeat(60))));
        assert!(text.contains("AI 成員：\n"));
    }
}
