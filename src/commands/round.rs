use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::clipboard::Clipboard;
use crate::commands::{RecordCommand, RoundCommand};
use crate::config::{self, Config};
use crate::errors::RoundtableError;
use crate::opener::open_path;
use crate::paths::quote;
use crate::record::{
    self, layout, previous_round_summary, read_round, OutputMode, RoundContext, RoundDraft,
};
use crate::state::{self, ActiveTopic};
use crate::template::{PlaceholderContext, Templates};

/// Create the folder of the round after the latest one.
pub async fn new_round(topic: &ActiveTopic) -> Result<u32> {
    if topic.members.is_empty() {
        return Err(RoundtableError::NoMembers(topic.name.clone()).into());
    }
    let next = record::scan_max_round(&topic.folder).await? + 1;
    let folder = record::round_dir(&topic.folder, next);
    fs::create_dir_all(&folder)
        .await
        .with_context(|| format!("無法建立輪次資料夾 {}", folder.display()))?;
    log::info!("已建立 {}", folder.display());
    Ok(next)
}

/// The requested round, or the latest one. The round folder must exist.
pub async fn resolve_round(topic: &ActiveTopic, round: Option<u32>) -> Result<u32> {
    let max_round = record::scan_max_round(&topic.folder).await?;
    match round {
        None if max_round == 0 => Err(RoundtableError::NoRounds(topic.name.clone()).into()),
        None => Ok(max_round),
        Some(n) if n == 0 || !record::round_dir(&topic.folder, n).is_dir() => {
            Err(RoundtableError::UnknownRound(n).into())
        }
        Some(n) => Ok(n),
    }
}

/// What the editor starts with for `round`: the saved files, or the active
/// opening and closing when nothing was saved yet.
pub async fn load_draft(topic: &ActiveTopic, templates: &Templates, round: u32) -> Result<(RoundDraft, bool)> {
    let saved = read_round(&topic.folder, round, &topic.members).await?;
    if saved.has_content() {
        return Ok((RoundDraft::from_saved(round, &saved), true));
    }
    let ctx = PlaceholderContext {
        topic_dir: Some(&topic.folder),
        round,
    };
    let draft = RoundDraft {
        round,
        question: templates.compose_question(&ctx),
        replies: BTreeMap::new(),
    };
    Ok((draft, false))
}

/// Write the round's files and refresh the cumulative record. Returns the
/// round folder.
pub async fn save_round(topic: &ActiveTopic, draft: &RoundDraft, config: &Config) -> Result<PathBuf> {
    let ctx = RoundContext {
        topic_name: &topic.name,
        topic_dir: &topic.folder,
        members: &topic.members,
    };
    let mode = OutputMode::from_prefs(config.discuss.no_full_record, config.discuss.only_full_record);
    let folder = record::write_round(&ctx, draft, mode).await?;
    record::rebuild_cumulative(&topic.folder, &topic.name, &topic.members).await?;
    Ok(folder)
}

/// Split `NAME=VALUE`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), RoundtableError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => Err(RoundtableError::BadAssignment(raw.to_string())),
    }
}

async fn read_text_file(raw: &str) -> Result<String> {
    let path = crate::paths::normalize_path(raw).unwrap_or_else(|| PathBuf::from(raw));
    fs::read_to_string(&path)
        .await
        .with_context(|| format!("無法讀取 {}", path.display()))
}

fn print_round(topic: &ActiveTopic, draft: &RoundDraft) {
    println!("{}", format!("══ {} ══", layout::round_dir_name(draft.round)).bold());
    println!("{}", "【本輪提問】".cyan());
    if draft.question.trim().is_empty() {
        println!("{}", record::UNFILLED.dimmed());
    } else {
        println!("{}", draft.question.trim());
    }
    for member in &topic.members {
        println!();
        println!("{}", format!("【{}】的回覆", member.name).cyan());
        match draft.reply(&member.name).trim() {
            "" => println!("{}", record::UNFILLED.dimmed()),
            reply => println!("{reply}"),
        }
    }
}

pub async fn print_previous_summary(topic: &ActiveTopic, round: u32) -> Result<()> {
    if round <= 1 {
        return Ok(());
    }
    let prev = read_round(&topic.folder, round - 1, &topic.members).await?;
    if !prev.has_content() {
        return Ok(());
    }
    println!(
        "{}",
        format!("── 上一輪（{}）摘要 ──", layout::round_dir_name(round - 1)).dimmed()
    );
    println!("{}", previous_round_summary(&prev).trim_end().dimmed());
    println!();
    Ok(())
}

pub async fn print_chapters(topic: &ActiveTopic, round: u32) -> Result<()> {
    let max_round = record::scan_max_round(&topic.folder).await?;
    let chapters: Vec<String> = record::chapter_window(round, max_round)
        .into_iter()
        .map(|n| {
            let name = layout::round_dir_name(n);
            if n == round {
                format!("[{name}]").bold().to_string()
            } else {
                name
            }
        })
        .collect();
    if !chapters.is_empty() {
        println!("章節: {}", chapters.join("  "));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_submit(
    topic: &ActiveTopic,
    templates: &Templates,
    config: &Config,
    round: Option<u32>,
    question: Option<String>,
    question_file: Option<String>,
    replies: Vec<String>,
    reply_files: Vec<String>,
    use_editor: bool,
) -> Result<()> {
    if topic.members.is_empty() {
        return Err(RoundtableError::NoMembers(topic.name.clone()).into());
    }
    let round = resolve_round(topic, round).await?;
    let (mut draft, _) = load_draft(topic, templates, round).await?;

    let mut question_given = false;
    if let Some(q) = question {
        draft.question = q;
        question_given = true;
    } else if let Some(file) = question_file {
        draft.question = read_text_file(&file).await?;
        question_given = true;
    }

    let mut given = Vec::new();
    for raw in &replies {
        let (name, text) = parse_assignment(raw)?;
        given.push((name, text));
    }
    for raw in &reply_files {
        let (name, file) = parse_assignment(raw)?;
        given.push((name, read_text_file(&file).await?));
    }
    let mut provided = Vec::new();
    for (name, text) in given {
        if !topic.members.iter().any(|m| m.name == name) {
            return Err(RoundtableError::UnknownMember(name).into());
        }
        provided.push(name.clone());
        draft.replies.insert(name, text);
    }

    if use_editor {
        if !question_given {
            draft.question = edit::edit(&draft.question).context("無法開啟編輯器")?;
        }
        for member in &topic.members {
            if provided.contains(&member.name) {
                continue;
            }
            println!("✍️  正在編輯【{}】的回覆...", member.name);
            let text = edit::edit(draft.reply(&member.name)).context("無法開啟編輯器")?;
            draft.replies.insert(member.name.clone(), text);
        }
    }

    let folder = save_round(topic, &draft, config).await?;
    println!(
        "{} {}",
        format!("✅ {} 已儲存至:", layout::round_dir_name(round)).green(),
        folder.display()
    );

    if config.discuss.auto_advance {
        let next = new_round(topic).await?;
        println!("{}", format!("➡️  已進入{}", layout::round_dir_name(next)).cyan());
    }
    Ok(())
}

pub async fn handle_round(command: RoundCommand) -> Result<()> {
    let discuss = state::load_discuss_state().await?;
    let topic = discuss.active_topic()?;
    let config = config::load_config().await?;

    match command {
        RoundCommand::New => {
            let round = new_round(&topic).await?;
            println!(
                "{} {}",
                format!("✅ 已建立{}:", layout::round_dir_name(round)).green(),
                record::round_dir(&topic.folder, round).display()
            );
        }
        RoundCommand::Show { round } => {
            let round = resolve_round(&topic, round).await?;
            let (draft, saved) = load_draft(&topic, &discuss.templates, round).await?;
            print_previous_summary(&topic, round).await?;
            print_chapters(&topic, round).await?;
            if !saved {
                println!("{}", "（本輪尚未儲存）".yellow());
            }
            print_round(&topic, &draft);
        }
        RoundCommand::List => {
            let rounds = record::list_rounds(&topic.folder).await?;
            if rounds.is_empty() {
                println!("{}", RoundtableError::NoRounds(topic.name.clone()).to_string().yellow());
                return Ok(());
            }
            for n in rounds {
                let saved = read_round(&topic.folder, n, &topic.members).await?;
                let full = layout::full_record_path(&topic.folder, n).exists();
                let filled = topic
                    .members
                    .iter()
                    .filter(|m| saved.reply(&m.name).is_some_and(|r| !r.is_empty()))
                    .count();
                let status = if saved.has_content() || full {
                    "已儲存 ✔".green()
                } else {
                    "空白".dimmed()
                };
                println!(
                    "  {}  {}  回覆 {}/{}",
                    layout::round_dir_name(n),
                    status,
                    filled,
                    topic.members.len()
                );
            }
        }
        RoundCommand::Submit {
            round,
            question,
            question_file,
            replies,
            reply_files,
            edit,
        } => {
            handle_submit(
                &topic,
                &discuss.templates,
                &config,
                round,
                question,
                question_file,
                replies,
                reply_files,
                edit,
            )
            .await?;
        }
        RoundCommand::Path { round } => {
            let round = resolve_round(&topic, round).await?;
            let text = quote(&record::round_dir(&topic.folder, round));
            let mut clipboard = Clipboard::new(&config);
            clipboard.copy_or_print(&text);
        }
    }
    Ok(())
}

pub async fn open_cumulative(topic_dir: &Path) -> Result<()> {
    let path = layout::cumulative_path(topic_dir);
    if !path.exists() {
        println!("{}", "尚無累積紀錄（送出至少一輪後產生）".yellow());
        return Ok(());
    }
    open_path(&path)
}

pub async fn handle_record(command: RecordCommand) -> Result<()> {
    let discuss = state::load_discuss_state().await?;
    let topic = discuss.active_topic()?;

    match command {
        RecordCommand::Rebuild => {
            let path = record::rebuild_cumulative(&topic.folder, &topic.name, &topic.members).await?;
            println!("{} {}", "✅ 已重建累積紀錄:".green(), path.display());
        }
        RecordCommand::Open => open_cumulative(&topic.folder).await?,
        RecordCommand::Folder => open_path(&topic.folder)?,
    }
    Ok(())
}
