use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::PathBuf;

use crate::clipboard::Clipboard;
use crate::commands::{ProjectCommand, ReportTemplate};
use crate::config;
use crate::errors::RoundtableError;
use crate::paths::normalize_path;
use crate::state::{self, WorkflowState};
use crate::workflow::{self, parse_list, prompts, Project, Role};

/// Scaffold a project and register it as the current one.
pub async fn create_and_register(
    state: &mut WorkflowState,
    base: &str,
    name: &str,
    code: &str,
    shared: &str,
    extra_c: &str,
) -> Result<(PathBuf, Vec<workflow::Created>)> {
    let name = name.trim();
    let base = normalize_path(base).ok_or_else(|| RoundtableError::MissingPath(PathBuf::from(base)))?;
    let (root, created) = workflow::create_project(&base, name, code).await?;

    let mut project = Project::new(&root, code);
    project.shared_files = parse_list(shared);
    project.extra_c_files = parse_list(extra_c);
    state.projects.insert(name.to_string(), project);
    state.last_project = name.to_string();
    Ok((root, created))
}

fn print_project(name: &str, project: &Project, active: bool) {
    let marker = if active { "*" } else { " " };
    println!(
        "{marker} {}  第 {} 輪  {}",
        name.cyan(),
        project.current_round,
        project.folder.dimmed()
    );
}

pub async fn handle_project(command: ProjectCommand) -> Result<()> {
    let mut state = state::load_workflow_state().await?;

    match command {
        ProjectCommand::Create {
            name,
            base,
            code,
            shared,
            extra_c,
        } => {
            let (root, created) =
                create_and_register(&mut state, &base, &name, &code, &shared, &extra_c).await?;
            state::save_workflow_state(&state).await?;

            println!("{}", format!("✅ 專案「{}」建立完成！", name.trim()).green());
            println!("路徑：{}", root.display());
            if created.is_empty() {
                println!("{}", "（所有資料夾和文件都已存在，無需建立）".dimmed());
            } else {
                println!("新建項目：");
                for item in &created {
                    println!("  {item}");
                }
            }
            println!(
                "下一步：執行 `roundtable opening architect` 取得窗口 A 的開場指令。"
            );
        }
        ProjectCommand::Use { name } => {
            let name = name.trim();
            if !state.projects.contains_key(name) {
                return Err(RoundtableError::UnknownProject(name.to_string()).into());
            }
            state.last_project = name.to_string();
            state::save_workflow_state(&state).await?;
            println!("{}", format!("已切換到專案：{name}").green());
        }
        ProjectCommand::List => {
            if state.projects.is_empty() {
                println!("{}", "尚未建立任何專案。".yellow());
            }
            for (name, project) in &state.projects {
                print_project(name, project, *name == state.last_project);
            }
        }
        ProjectCommand::Remove { name, yes } => {
            let name = name.trim().to_string();
            if !state.projects.contains_key(&name) {
                return Err(RoundtableError::UnknownProject(name).into());
            }
            if !yes
                && !Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("從設定中移除專案「{name}」？（不會刪除實際檔案）"))
                    .default(false)
                    .interact()?
            {
                println!("好的，操作已取消。");
                return Ok(());
            }
            state.projects.remove(&name);
            if state.last_project == name {
                state.last_project.clear();
            }
            state::save_workflow_state(&state).await?;
            println!("{}", format!("🗑️ 已移除專案「{name}」").green());
        }
        ProjectCommand::Edit {
            name,
            folder,
            code,
            round,
            shared,
            extra_c,
        } => {
            let name = name.trim().to_string();
            let project = state
                .projects
                .get_mut(&name)
                .ok_or_else(|| RoundtableError::UnknownProject(name.clone()))?;
            if let Some(folder) = folder {
                project.folder = folder.trim().to_string();
            }
            if let Some(code) = code {
                project.code_folder = code.trim().to_string();
            }
            if let Some(round) = round {
                project.current_round = round.max(1);
            }
            if let Some(shared) = shared {
                project.shared_files = parse_list(&shared);
            }
            if let Some(extra_c) = extra_c {
                project.extra_c_files = parse_list(&extra_c);
            }
            let snapshot = project.clone();
            state::save_workflow_state(&state).await?;
            println!("{}", format!("✅ 專案「{name}」設定已更新").green());
            print_project(&name, &snapshot, name == state.last_project);
        }
        ProjectCommand::Template { which } => {
            let text = match which {
                ReportTemplate::Requirement => prompts::REQUIREMENT_TEMPLATE,
                ReportTemplate::Issue => prompts::ISSUE_TEMPLATE,
            };
            let config = config::load_config().await?;
            Clipboard::new(&config).copy_or_print(text);
        }
    }
    Ok(())
}

pub async fn handle_opening(role: Role) -> Result<()> {
    let state = state::load_workflow_state().await?;
    let (name, project) = state.active_project()?;
    let config = config::load_config().await?;

    let text = workflow::role_opening(role, project, &config.workflow.shared_dir);
    println!("專案：{}", name.cyan());
    Clipboard::new(&config).copy_or_print(&text);
    println!("{}", format!("→ {}", role.hint()).bold());
    Ok(())
}

pub async fn handle_launch() -> Result<()> {
    let state = state::load_workflow_state().await?;
    let (_, project) = state.active_project()?;
    let config = config::load_config().await?;

    let command = workflow::launch_command(project, &config.workflow.cli_command);
    Clipboard::new(&config).copy_or_print(&command);
    println!("→ 貼到終端機，進入代碼資料夾並啟動 AI CLI");
    Ok(())
}

pub async fn handle_complete() -> Result<()> {
    let mut state = state::load_workflow_state().await?;
    let (name, project) = state.active_project_mut()?;
    let next = workflow::complete_round(project).await;
    state::save_workflow_state(&state).await?;
    println!("{}", format!("🎉 專案「{name}」本輪完成！下一輪：第 {next} 輪").green());
    Ok(())
}
