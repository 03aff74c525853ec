use anyhow::{Context, Result};
use colored::Colorize;

use crate::clipboard::Clipboard;
use crate::commands::TemplateCommand;
use crate::config;
use crate::errors::RoundtableError;
use crate::record;
use crate::state::{self, DiscussState};
use crate::template::{preview_line, PlaceholderContext, TemplateKind, Templates};

const PREVIEW_CHARS: usize = 40;

/// 1-based index typed by the user to a vector index.
fn to_index(kind: TemplateKind, index: usize) -> Result<usize, RoundtableError> {
    index
        .checked_sub(1)
        .ok_or(RoundtableError::UnknownTemplate {
            kind: kind.label(),
            index,
        })
}

fn print_templates(templates: &Templates) {
    let switch = |on: bool| if on { "啟用".green() } else { "停用".dimmed() };

    println!("{} （{}）", TemplateKind::Opening.label().bold(), switch(templates.use_opening));
    if templates.openings.is_empty() {
        println!("  {}", "（無）".dimmed());
    }
    for (i, item) in templates.openings.iter().enumerate() {
        let mark = if item.active { "●".green() } else { "○".dimmed() };
        println!("  {mark} {}. {}  {}", i + 1, item.name.cyan(), preview_line(&item.text, PREVIEW_CHARS).dimmed());
    }

    println!("{} （{}）", TemplateKind::Closing.label().bold(), switch(templates.use_closing));
    if templates.closings.is_empty() {
        println!("  {}", "（無）".dimmed());
    }
    for (i, item) in templates.closings.iter().enumerate() {
        let mark = if item.active { "●".green() } else { "○".dimmed() };
        println!("  {mark} {}. {}  {}", i + 1, item.name.cyan(), preview_line(&item.text, PREVIEW_CHARS).dimmed());
    }

    println!("{}", TemplateKind::Canned.label().bold());
    if templates.canned.is_empty() {
        println!("  {}", "（無）".dimmed());
    }
    for (i, item) in templates.canned.iter().enumerate() {
        println!("  {}. {}  {}", i + 1, item.name.cyan(), preview_line(&item.text, PREVIEW_CHARS).dimmed());
    }
}

async fn save(state: &mut DiscussState) -> Result<()> {
    for kind in state.templates.normalize_switches() {
        log::info!("{}沒有可用的啟用方案，已關閉", kind.label());
    }
    state::save_discuss_state(state).await
}

fn current_text(templates: &Templates, kind: TemplateKind, index: usize) -> Option<&str> {
    match kind {
        TemplateKind::Opening => templates.openings.get(index).map(|it| it.text.as_str()),
        TemplateKind::Closing => templates.closings.get(index).map(|it| it.text.as_str()),
        TemplateKind::Canned => templates.canned.get(index).map(|it| it.text.as_str()),
    }
}

/// Text of a canned snippet with its placeholders resolved against the
/// current topic, if any.
pub async fn resolve_canned(state: &DiscussState, index: usize, round: Option<u32>) -> Result<String> {
    let topic = state.active_topic().ok();
    let round = match (&topic, round) {
        (_, Some(n)) => n,
        (Some(t), None) => record::scan_max_round(&t.folder).await?.max(1),
        (None, None) => 1,
    };
    let ctx = PlaceholderContext {
        topic_dir: topic.as_ref().map(|t| t.folder.as_path()),
        round,
    };
    Ok(state.templates.canned_text(index, &ctx)?)
}

pub async fn handle_template(command: TemplateCommand) -> Result<()> {
    let mut state = state::load_discuss_state().await?;

    match command {
        TemplateCommand::List => print_templates(&state.templates),
        TemplateCommand::Add { kind, name, text } => {
            let text = match text {
                Some(t) => t,
                None => edit::edit("").context("無法開啟編輯器")?,
            };
            let idx = state
                .templates
                .add(kind, name.as_deref().unwrap_or(""), &text)?;
            save(&mut state).await?;
            println!(
                "{} #{}",
                format!("✅ 已新增{}", kind.label()).green(),
                idx + 1
            );
        }
        TemplateCommand::Edit { kind, index, name, text } => {
            let idx = to_index(kind, index)?;
            let text = match (&name, text) {
                (_, Some(t)) => Some(t),
                (None, None) => {
                    let current = current_text(&state.templates, kind, idx).ok_or(
                        RoundtableError::UnknownTemplate {
                            kind: kind.label(),
                            index,
                        },
                    )?;
                    Some(edit::edit(current).context("無法開啟編輯器")?)
                }
                (Some(_), None) => None,
            };
            state
                .templates
                .edit(kind, idx, name.as_deref(), text.as_deref())?;
            save(&mut state).await?;
            println!("{}", format!("✅ 已更新第 {index} 個{}", kind.label()).green());
        }
        TemplateCommand::Remove { kind, index } => {
            let removed = state.templates.remove(kind, to_index(kind, index)?)?;
            save(&mut state).await?;
            println!("{} {}", format!("🗑️ 已刪除{}:", kind.label()).green(), removed.cyan());
        }
        TemplateCommand::Activate { kind, index } => {
            state.templates.set_active(kind, to_index(kind, index)?, true)?;
            save(&mut state).await?;
            print_templates(&state.templates);
        }
        TemplateCommand::Deactivate { kind, index } => {
            state.templates.set_active(kind, to_index(kind, index)?, false)?;
            save(&mut state).await?;
            print_templates(&state.templates);
        }
        TemplateCommand::Canned { index, round } => {
            let idx = to_index(TemplateKind::Canned, index)?;
            let text = resolve_canned(&state, idx, round).await?;
            let config = config::load_config().await?;
            Clipboard::new(&config).copy_or_print(&text);
        }
    }
    Ok(())
}
