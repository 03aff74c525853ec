use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::layout::{self, QUESTION_FILE};
use super::{timestamp, UNFILLED};
use crate::state::Member;

/// 回覆預覽的最大字數。
const PREVIEW_CHARS: usize = 300;

/// What is on disk for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedRound {
    pub question: String,
    /// Replies keyed by member name, in member order.
    pub replies: Vec<(String, String)>,
}

impl SavedRound {
    pub fn has_content(&self) -> bool {
        !self.question.is_empty() || !self.replies.is_empty()
    }

    pub fn reply(&self, member: &str) -> Option<&str> {
        self.replies
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, text)| text.as_str())
    }
}

/// The editable contents of a round before it is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundDraft {
    pub round: u32,
    pub question: String,
    pub replies: BTreeMap<String, String>,
}

impl RoundDraft {
    pub fn from_saved(round: u32, saved: &SavedRound) -> Self {
        Self {
            round,
            question: saved.question.clone(),
            replies: saved
                .replies
                .iter()
                .map(|(name, text)| (name.clone(), text.clone()))
                .collect(),
        }
    }

    pub fn reply(&self, member: &str) -> &str {
        self.replies.get(member).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.question.trim().is_empty() && self.replies.values().all(|r| r.trim().is_empty())
    }

    /// Whether this draft holds text that `saved` does not. A snapshot of a
    /// different round counts as unsaved as soon as anything is filled in.
    pub fn differs_from(&self, saved: &RoundDraft) -> bool {
        if saved.round != self.round {
            return !self.is_blank();
        }
        if self.question.trim() != saved.question.trim() {
            return true;
        }
        let names = self.replies.keys().chain(saved.replies.keys());
        for name in names {
            if self.reply(name).trim() != saved.reply(name).trim() {
                return true;
            }
        }
        false
    }
}

/// Which files a submit produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    pub full: bool,
    pub split: bool,
}

impl OutputMode {
    /// 兩個開關都關閉輸出時，改成兩種都輸出。
    pub fn from_prefs(no_full_record: bool, only_full_record: bool) -> Self {
        let full = !no_full_record;
        let split = !only_full_record;
        if !full && !split {
            return Self {
                full: true,
                split: true,
            };
        }
        Self { full, split }
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::from_prefs(false, false)
    }
}

/// Strip the header of a reply file: everything up to and including the
/// first line starting with ten `-` or ten `=`.
pub fn reply_body(content: &str) -> String {
    let mut past_header = false;
    let mut body = String::new();
    for line in content.split_inclusive('\n') {
        if past_header {
            body.push_str(line);
        } else if line.starts_with(&"-".repeat(10)) || line.starts_with(&"=".repeat(10)) {
            past_header = true;
        }
    }
    let body = body.trim();
    if body == UNFILLED {
        return String::new();
    }
    body.to_string()
}

/// Recover the question and replies from a `第N輪_完整紀錄.txt`. Each
/// section ends at the next `=` rule; members without a section are left out.
pub fn parse_full_record(content: &str, members: &[Member]) -> SavedRound {
    let rule = "=".repeat(60);
    let lines: Vec<&str> = content.lines().collect();
    let section_end = |start: usize| {
        lines[start..]
            .iter()
            .position(|line| *line == rule)
            .map_or(lines.len(), |offset| start + offset)
    };
    let body = |start: usize, end: usize| {
        let text = lines[start..end].join("\n");
        match text.trim() {
            UNFILLED => String::new(),
            text => text.to_string(),
        }
    };

    let mut saved = SavedRound::default();
    let mut cursor = 0;
    if let Some(pos) = lines.iter().position(|line| *line == "【本輪提問】") {
        let end = section_end(pos + 1);
        saved.question = body(pos + 1, end);
        cursor = end;
    }

    for member in members {
        let header = format!("【{}】的回覆", member.name);
        let Some(pos) = lines[cursor..].iter().position(|line| *line == header) else {
            continue;
        };
        let start = cursor + pos + 1;
        let end = section_end(start);
        let separator = lines[start..end]
            .iter()
            .position(|line| line.starts_with(&"-".repeat(10)));
        let text = match separator {
            Some(offset) => body(start + offset + 1, end),
            None => String::new(),
        };
        saved.replies.push((member.name.clone(), text));
    }
    saved
}

pub async fn read_round(topic_dir: &Path, round: u32, members: &[Member]) -> Result<SavedRound> {
    let folder = layout::round_dir(topic_dir, round);
    let mut saved = SavedRound::default();

    let question_path = folder.join(QUESTION_FILE);
    if question_path.exists() {
        saved.question = fs::read_to_string(&question_path)
            .await
            .with_context(|| format!("無法讀取 {}", question_path.display()))?;
    }

    for member in members {
        let reply_path = folder.join(layout::reply_file_name(&member.name));
        if !reply_path.exists() {
            continue;
        }
        let content = fs::read_to_string(&reply_path)
            .await
            .with_context(|| format!("無法讀取 {}", reply_path.display()))?;
        saved.replies.push((member.name.clone(), reply_body(&content)));
    }

    // only-full-record rounds have nothing but the full record on disk
    if !saved.has_content() {
        let full_path = folder.join(layout::full_record_file_name(round));
        if full_path.exists() {
            let content = fs::read_to_string(&full_path)
                .await
                .with_context(|| format!("無法讀取 {}", full_path.display()))?;
            saved = parse_full_record(&content, members);
        }
    }

    Ok(saved)
}

/// Text shown above a round: the previous question and a preview of every
/// reply.
pub fn previous_round_summary(saved: &SavedRound) -> String {
    let mut summary = String::new();
    if !saved.question.is_empty() {
        summary.push_str(&format!("【我的問題】\n{}\n\n", saved.question));
    }
    for (name, reply) in &saved.replies {
        summary.push_str(&format!("【{name}】\n{}\n\n", preview(reply, PREVIEW_CHARS)));
    }
    summary
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Context needed to render the headers of a round's files.
pub struct RoundContext<'a> {
    pub topic_name: &'a str,
    pub topic_dir: &'a Path,
    pub members: &'a [Member],
}

fn or_unfilled(text: &str) -> &str {
    if text.is_empty() {
        UNFILLED
    } else {
        text
    }
}

pub fn render_full_record(ctx: &RoundContext<'_>, draft: &RoundDraft, time: &str) -> String {
    let rn = layout::round_dir_name(draft.round);
    let rule = "=".repeat(60);
    let question = draft.question.trim();

    let mut lines: Vec<String> = vec![
        format!("主題：{}", ctx.topic_name.trim()),
        format!("輪次：{rn}"),
        format!("時間：{time}"),
        rule.clone(),
        String::new(),
        "【本輪提問】".to_string(),
        question.to_string(),
        String::new(),
        rule.clone(),
    ];
    for member in ctx.members {
        let reply = draft.reply(&member.name).trim();
        lines.push(String::new());
        lines.push(format!("【{}】的回覆", member.name));
        if let Some(path) = member.path() {
            lines.push(format!("專案路徑：{path}"));
        }
        lines.push("-".repeat(40));
        lines.push(or_unfilled(reply).to_string());
        lines.push(String::new());
        lines.push(rule.clone());
    }
    lines.join("\n")
}

pub fn render_reply_file(member: &Member, round: u32, reply: &str) -> String {
    let mut out = format!("AI 名稱：{}\n", member.name);
    if let Some(path) = member.path() {
        out.push_str(&format!("專案路徑：{path}\n"));
    }
    out.push_str(&format!("輪次：{}\n", layout::round_dir_name(round)));
    out.push_str(&"-".repeat(40));
    out.push('\n');
    out.push_str(or_unfilled(reply.trim()));
    out
}

/// Write the round's files, overwriting whatever is there. Returns the round
/// folder.
pub async fn write_round(
    ctx: &RoundContext<'_>,
    draft: &RoundDraft,
    mode: OutputMode,
) -> Result<PathBuf> {
    let folder = layout::round_dir(ctx.topic_dir, draft.round);
    fs::create_dir_all(&folder)
        .await
        .with_context(|| format!("無法建立輪次資料夾 {}", folder.display()))?;

    if mode.full {
        let path = folder.join(layout::full_record_file_name(draft.round));
        fs::write(&path, render_full_record(ctx, draft, &timestamp()))
            .await
            .with_context(|| format!("無法寫入 {}", path.display()))?;
        log::debug!("已寫入完整紀錄 {}", path.display());
    }

    if mode.split {
        for member in ctx.members {
            let path = folder.join(layout::reply_file_name(&member.name));
            let content = render_reply_file(member, draft.round, draft.reply(&member.name));
            fs::write(&path, content)
                .await
                .with_context(|| format!("無法寫入 {}", path.display()))?;
        }
        let path = folder.join(QUESTION_FILE);
        fs::write(&path, draft.question.trim())
            .await
            .with_context(|| format!("無法寫入 {}", path.display()))?;
    }

    Ok(folder)
}
