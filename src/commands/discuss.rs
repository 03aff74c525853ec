//! Interactive recorder: one round at a time, question plus one reply per
//! member, edited in `$EDITOR` and saved on demand.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};

use crate::clipboard::Clipboard;
use crate::commands::round::{
    load_draft, new_round, open_cumulative, print_chapters, print_previous_summary, save_round,
};
use crate::config::{self, Config};
use crate::opener::open_path;
use crate::paths::quote;
use crate::record::{self, layout, RoundDraft};
use crate::state::{self, ActiveTopic};
use crate::template::{PlaceholderContext, Templates};

/// Append a snippet to the question on its own line.
pub fn append_snippet(question: &mut String, snippet: &str) {
    if snippet.is_empty() {
        return;
    }
    if !question.is_empty() && !question.ends_with('\n') {
        question.push('\n');
    }
    question.push_str(snippet);
}

/// What the user decided when leaving with unsaved text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeaveChoice {
    Save,
    Discard,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
enum MenuItem {
    EditQuestion,
    InsertCanned,
    InsertPath,
    EditReply(String),
    CopyQuestion,
    Submit,
    Previous,
    Next,
    NewRound,
    OpenFolder,
    OpenCumulative,
    Quit,
}

/// The round being edited plus the last saved (or loaded) version of it.
pub struct Session {
    topic: ActiveTopic,
    templates: Templates,
    config: Config,
    draft: RoundDraft,
    snapshot: RoundDraft,
    max_round: u32,
}

impl Session {
    pub async fn open(topic: ActiveTopic, templates: Templates, config: Config) -> Result<Self> {
        let max_round = record::scan_max_round(&topic.folder).await?;
        let mut session = Self {
            topic,
            templates,
            config,
            draft: RoundDraft::default(),
            snapshot: RoundDraft::default(),
            max_round,
        };
        if max_round > 0 {
            session.goto(max_round).await?;
        }
        Ok(session)
    }

    pub fn round(&self) -> u32 {
        self.draft.round
    }

    pub fn draft_mut(&mut self) -> &mut RoundDraft {
        &mut self.draft
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.draft.round > 0 && self.draft.differs_from(&self.snapshot)
    }

    /// Load `round` from disk. Whatever was loaded becomes the snapshot.
    pub async fn goto(&mut self, round: u32) -> Result<()> {
        let (draft, _) = load_draft(&self.topic, &self.templates, round).await?;
        self.snapshot = draft.clone();
        self.draft = draft;
        self.max_round = record::scan_max_round(&self.topic.folder).await?;
        Ok(())
    }

    pub async fn new_round(&mut self) -> Result<u32> {
        let round = new_round(&self.topic).await?;
        self.goto(round).await?;
        Ok(round)
    }

    /// Save the current round. With `advance`, the configured auto-advance
    /// may move on to a fresh round afterwards.
    pub async fn submit(&mut self, advance: bool) -> Result<()> {
        if self.draft.round == 0 {
            return Ok(());
        }
        let folder = save_round(&self.topic, &self.draft, &self.config).await?;
        self.snapshot = self.draft.clone();
        self.max_round = record::scan_max_round(&self.topic.folder).await?;
        println!(
            "{} {}",
            format!("✅ {} 已儲存至:", layout::round_dir_name(self.draft.round)).green(),
            folder.display()
        );
        if advance && self.config.discuss.auto_advance {
            let next = self.new_round().await?;
            println!("{}", format!("➡️  已進入{}", layout::round_dir_name(next)).cyan());
        }
        Ok(())
    }

    fn placeholders(&self) -> PlaceholderContext<'_> {
        PlaceholderContext {
            topic_dir: Some(&self.topic.folder),
            round: self.draft.round,
        }
    }

    fn menu(&self) -> Vec<(String, MenuItem)> {
        let mut items = Vec::new();
        if self.draft.round > 0 {
            items.push(("📝 編輯本輪提問".to_string(), MenuItem::EditQuestion));
            if !self.templates.canned.is_empty() {
                items.push(("📎 插入罐頭信息".to_string(), MenuItem::InsertCanned));
            }
            items.push(("📂 插入輪次路徑".to_string(), MenuItem::InsertPath));
            for member in &self.topic.members {
                let filled = if self.draft.reply(&member.name).trim().is_empty() {
                    ""
                } else {
                    " ✔"
                };
                items.push((
                    format!("🤖 編輯【{}】的回覆{filled}", member.name),
                    MenuItem::EditReply(member.name.clone()),
                ));
            }
            items.push(("📋 複製本輪提問".to_string(), MenuItem::CopyQuestion));
            items.push(("💾 送出本輪".to_string(), MenuItem::Submit));
            if self.draft.round > 1 {
                items.push(("⬅️  上一輪".to_string(), MenuItem::Previous));
            }
            if self.draft.round < self.max_round {
                items.push(("➡️  下一輪".to_string(), MenuItem::Next));
            }
        }
        items.push(("🆕 新一輪".to_string(), MenuItem::NewRound));
        items.push(("📁 開啟主題資料夾".to_string(), MenuItem::OpenFolder));
        items.push(("📜 開啟累積紀錄".to_string(), MenuItem::OpenCumulative));
        items.push(("🚪 離開".to_string(), MenuItem::Quit));
        items
    }

    async fn print_header(&self) -> Result<()> {
        println!();
        println!("{}", "=".repeat(60));
        println!("主題: {}", self.topic.name.bold());
        if self.draft.round == 0 {
            println!("{}", "尚無輪次，請選擇「新一輪」開始。".yellow());
            return Ok(());
        }
        print_previous_summary(&self.topic, self.draft.round).await?;
        print_chapters(&self.topic, self.draft.round).await?;
        let status = if self.has_unsaved_changes() {
            "（未儲存）".yellow()
        } else {
            "".normal()
        };
        println!(
            "{} {status}",
            format!("══ {} ══", layout::round_dir_name(self.draft.round)).bold()
        );
        match self.draft.question.trim() {
            "" => println!("{}", "（提問尚未填寫）".dimmed()),
            q => println!("{}", crate::template::preview_line(q, 80)),
        }
        Ok(())
    }
}

fn ask_leave() -> Result<LeaveChoice> {
    let options = &["💾 保存並離開", "🗑️ 不保存並離開", "↩️ 取消"];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("偵測到目前有未儲存內容")
        .items(&options[..])
        .default(0)
        .interact()?;
    Ok(match selection {
        0 => LeaveChoice::Save,
        1 => LeaveChoice::Discard,
        _ => LeaveChoice::Cancel,
    })
}

/// Ask before dropping unsaved text when switching rounds.
fn confirm_discard(session: &Session) -> Result<bool> {
    if !session.has_unsaved_changes() {
        return Ok(true);
    }
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("本輪有未儲存內容，確定要切換並放棄嗎？")
        .default(false)
        .interact()?)
}

async fn insert_canned(session: &mut Session) -> Result<()> {
    let names: Vec<String> = session
        .templates
        .canned
        .iter()
        .map(|c| format!("{}  {}", c.name, crate::template::preview_line(&c.text, 30)))
        .collect();
    let Some(idx) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("選擇要插入的罐頭信息")
        .items(&names)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };
    let text = session.templates.canned_text(idx, &session.placeholders())?;
    append_snippet(&mut session.draft_mut().question, &text);
    println!("{}", "✅ 已插入到提問末尾".green());
    Ok(())
}

async fn insert_path(session: &mut Session) -> Result<()> {
    let rounds = record::chapter_window(session.round(), session.max_round);
    let labels: Vec<String> = rounds.iter().map(|n| layout::round_dir_name(*n)).collect();
    let Some(idx) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("插入哪一輪的路徑")
        .items(&labels)
        .default(rounds.iter().position(|n| *n == session.round()).unwrap_or(0))
        .interact_opt()?
    else {
        return Ok(());
    };
    let path = quote(&record::round_dir(&session.topic.folder, rounds[idx]));
    append_snippet(&mut session.draft_mut().question, &path);
    println!("{} {}", "✅ 已插入".green(), path);
    Ok(())
}

/// Whether the menu loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

async fn run_action(session: &mut Session, clipboard: &mut Clipboard, item: MenuItem) -> Result<Flow> {
    match item {
        MenuItem::EditQuestion => {
            let text = edit::edit(&session.draft.question).context("無法開啟編輯器")?;
            session.draft_mut().question = text.trim_end().to_string();
        }
        MenuItem::InsertCanned => insert_canned(session).await?,
        MenuItem::InsertPath => insert_path(session).await?,
        MenuItem::EditReply(name) => {
            let current = session.draft.reply(&name).to_string();
            let text = edit::edit(&current).context("無法開啟編輯器")?;
            session
                .draft_mut()
                .replies
                .insert(name, text.trim_end().to_string());
        }
        MenuItem::CopyQuestion => clipboard.copy_or_print(session.draft.question.trim()),
        MenuItem::Submit => session.submit(true).await?,
        MenuItem::Previous => {
            let target = session.round() - 1;
            if confirm_discard(session)? {
                session.goto(target).await?;
            }
        }
        MenuItem::Next => {
            let target = session.round() + 1;
            if confirm_discard(session)? {
                session.goto(target).await?;
            }
        }
        MenuItem::NewRound => {
            if confirm_discard(session)? {
                session.new_round().await?;
            }
        }
        MenuItem::OpenFolder => open_path(&session.topic.folder)?,
        MenuItem::OpenCumulative => open_cumulative(&session.topic.folder).await?,
        MenuItem::Quit => {
            if !session.has_unsaved_changes() {
                return Ok(Flow::Quit);
            }
            match ask_leave()? {
                LeaveChoice::Save => {
                    // leaving never moves on to a new round
                    session.submit(false).await?;
                    return Ok(Flow::Quit);
                }
                LeaveChoice::Discard => return Ok(Flow::Quit),
                LeaveChoice::Cancel => {}
            }
        }
    }
    Ok(Flow::Continue)
}

/// A failed action is reported and the session goes on, unless the terminal
/// prompt itself failed.
fn ends_session(err: &anyhow::Error) -> bool {
    err.downcast_ref::<dialoguer::Error>().is_some()
}

pub async fn handle_discuss() -> Result<()> {
    let discuss = state::load_discuss_state().await?;
    let topic = discuss.active_topic_with_members()?;
    let config = config::load_config().await?;
    let mut clipboard = Clipboard::new(&config);
    let mut session = Session::open(topic, discuss.templates, config).await?;

    loop {
        session.print_header().await?;
        let menu = session.menu();
        let labels: Vec<&str> = menu.iter().map(|(label, _)| label.as_str()).collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("要做什麼？")
            .items(&labels)
            .default(0)
            .interact()?;

        match run_action(&mut session, &mut clipboard, menu[selection].1.clone()).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) if ends_session(&e) => return Err(e),
            Err(e) => {
                log::debug!("選單動作失敗: {e:?}");
                println!("{} {e:#}", "❌".red());
            }
        }
    }

    println!("👋 再見！");
    Ok(())
}
