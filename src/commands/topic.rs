use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tokio::fs;

use crate::commands::{MemberCommand, TopicCommand};
use crate::config;
use crate::errors::RoundtableError;
use crate::paths::normalize_path;
use crate::record;
use crate::state::{self, ActiveTopic, DiscussState, Member};

/// Create the topic folder under `root` (or reuse it) and make it the
/// current topic. Members of an already known topic are kept.
pub async fn create_topic(state: &mut DiscussState, name: &str, root: &Path) -> Result<ActiveTopic> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RoundtableError::EmptyName.into());
    }

    let folder = root.join(name);
    if folder.exists() && !folder.is_dir() {
        return Err(RoundtableError::NotADirectory(folder).into());
    }
    fs::create_dir_all(&folder)
        .await
        .with_context(|| format!("無法建立或載入主題資料夾：\n{}", folder.display()))?;

    let info = state.topics.entry(name.to_string()).or_default();
    info.folder = folder.display().to_string();
    state.last_topic = name.to_string();

    Ok(state.topic(name)?)
}

/// Resolve a member given by name or by 1-based position.
pub fn find_member(members: &[Member], key: &str) -> Result<usize, RoundtableError> {
    let key = key.trim();
    if let Some(idx) = members.iter().position(|m| m.name == key) {
        return Ok(idx);
    }
    match key.parse::<usize>() {
        Ok(n) if (1..=members.len()).contains(&n) => Ok(n - 1),
        _ => Err(RoundtableError::UnknownMember(key.to_string())),
    }
}

/// Persist the member list of the current topic and rewrite its roster file.
async fn save_members(state: &mut DiscussState, topic: &ActiveTopic) -> Result<()> {
    let info = state.topics.entry(topic.name.clone()).or_default();
    info.ai_list = topic.members.clone();
    info.folder = topic.folder.display().to_string();
    state::save_discuss_state(state).await?;
    record::write_members_file(&topic.folder, &topic.name, &topic.members).await?;
    Ok(())
}

pub fn print_members(members: &[Member]) {
    if members.is_empty() {
        println!("{}", "（尚無 AI 成員）".dimmed());
        return;
    }
    for (i, m) in members.iter().enumerate() {
        match m.path() {
            Some(path) => println!("  {}. {}  →  {}", i + 1, m.name.cyan(), path),
            None => println!("  {}. {}", i + 1, m.name.cyan()),
        }
    }
}

async fn print_topic(topic: &ActiveTopic) -> Result<()> {
    let max_round = record::scan_max_round(&topic.folder).await?;
    println!("主題: {}", topic.name.bold());
    println!("資料夾: {}", topic.folder.display());
    if max_round > 0 {
        println!("{}", format!("✔ 共 {max_round} 輪").green());
    } else {
        println!("{}", "✔ 已建立，尚無輪次".green());
    }
    println!("AI 成員:");
    print_members(&topic.members);
    Ok(())
}

pub async fn handle_topic(command: TopicCommand) -> Result<()> {
    let mut state = state::load_discuss_state().await?;

    match command {
        TopicCommand::Create { name, root } => {
            let config = config::load_config().await?;
            let root = root
                .as_deref()
                .and_then(normalize_path)
                .unwrap_or_else(|| config::default_topic_root(&config));
            fs::create_dir_all(&root)
                .await
                .with_context(|| format!("無法建立主題根目錄：\n{}", root.display()))?;

            let topic = create_topic(&mut state, &name, &root).await?;
            state::save_discuss_state(&state).await?;
            log::info!("已載入主題 {} ({})", topic.name, topic.folder.display());
            print_topic(&topic).await?;
            if topic.members.is_empty() {
                println!(
                    "{}",
                    "請用 `roundtable member add <名稱>` 新增 AI 成員後再開始新一輪。".yellow()
                );
            }
        }
        TopicCommand::Use { name } => {
            let topic = state.topic(name.trim())?;
            fs::create_dir_all(&topic.folder)
                .await
                .with_context(|| format!("無法建立或載入主題資料夾：\n{}", topic.folder.display()))?;
            state.last_topic = topic.name.clone();
            state::save_discuss_state(&state).await?;
            print_topic(&topic).await?;
        }
        TopicCommand::List => {
            if state.topics.is_empty() {
                println!("{}", "尚未建立任何主題。".yellow());
                return Ok(());
            }
            let names: Vec<String> = state.topics.keys().cloned().collect();
            for name in names {
                let marker = if name == state.last_topic { "*" } else { " " };
                match state.topic(&name) {
                    Ok(topic) => {
                        let rounds = record::scan_max_round(&topic.folder).await?;
                        println!(
                            "{marker} {}  ({} 輪, {} 位 AI)  {}",
                            name.cyan(),
                            rounds,
                            topic.members.len(),
                            topic.folder.display().to_string().dimmed()
                        );
                    }
                    Err(e) => println!("{marker} {}  {}", name.cyan(), e.to_string().red()),
                }
            }
        }
        TopicCommand::Show => {
            let topic = state.active_topic()?;
            print_topic(&topic).await?;
        }
    }
    Ok(())
}

pub async fn handle_member(command: MemberCommand) -> Result<()> {
    let mut state = state::load_discuss_state().await?;
    let mut topic = state.active_topic()?;

    match command {
        MemberCommand::Add { name, path } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(RoundtableError::EmptyName.into());
            }
            let path = path.unwrap_or_default();
            topic.members.push(Member::new(name, path.trim()));
            save_members(&mut state, &topic).await?;
            println!("{} {}", "✅ 已新增 AI 成員:".green(), name.cyan());
            print_members(&topic.members);
        }
        MemberCommand::Remove { member } => {
            let idx = find_member(&topic.members, &member)?;
            let removed = topic.members.remove(idx);
            save_members(&mut state, &topic).await?;
            println!("{} {}", "🗑️ 已移除 AI 成員:".green(), removed.name.cyan());
            print_members(&topic.members);
        }
        MemberCommand::List => {
            println!("主題「{}」的 AI 成員:", topic.name);
            print_members(&topic.members);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_topic_makes_folder_and_selects_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = DiscussState::default();

        let topic = create_topic(&mut state, "  新主題 ", dir.path()).await.unwrap();
        assert_eq!(topic.name, "新主題");
        assert_eq!(topic.folder, dir.path().join("新主題"));
        assert!(topic.folder.is_dir());
        assert_eq!(state.last_topic, "新主題");
    }

    #[tokio::test]
    async fn create_topic_keeps_known_members() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = DiscussState::default();
        create_topic(&mut state, "t", dir.path()).await.unwrap();
        state.topics.get_mut("t").unwrap().ai_list.push(Member::new("A", ""));

        let other = dir.path().join("elsewhere");
        std::fs::create_dir(&other).unwrap();
        let topic = create_topic(&mut state, "t", &other).await.unwrap();
        assert_eq!(topic.members, vec![Member::new("A", "")]);
        assert_eq!(topic.folder, other.join("t"));
    }

    #[tokio::test]
    async fn create_topic_rejects_file_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("busy"), "x").unwrap();
        let mut state = DiscussState::default();

        let err = create_topic(&mut state, "busy", dir.path()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RoundtableError>(),
            Some(RoundtableError::NotADirectory(_))
        ));
        let err = create_topic(&mut state, " ", dir.path()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RoundtableError>(),
            Some(RoundtableError::EmptyName)
        ));
        assert!(state.last_topic.is_empty());
    }

    #[test]
    fn members_are_found_by_name_or_position() {
        let members = vec![Member::new("Claude", ""), Member::new("2", "")];
        assert_eq!(find_member(&members, "Claude").unwrap(), 0);
        assert_eq!(find_member(&members, "1").unwrap(), 0);
        // a name wins over a position
        assert_eq!(find_member(&members, "2").unwrap(), 1);
        assert!(find_member(&members, "3").is_err());
        assert!(find_member(&members, "GPT").is_err());
    }
}
