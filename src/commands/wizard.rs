use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::clipboard::{print_block, Clipboard};
use crate::config;
use crate::errors::RoundtableError;
use crate::state::{self, WorkflowState};
use crate::template::preview_line;
use crate::workflow::prompts::{ISSUE_TEMPLATE, REQUIREMENT_TEMPLATE};
use crate::workflow::wizard::{Action, Effect, Step, Wizard};
use crate::workflow::{self, Role};

fn choose(prompt: &str, options: &[&str]) -> Result<usize> {
    Ok(Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(options)
        .default(0)
        .interact()?)
}

/// Ways to start the requirement text at step 1, with the text the editor
/// opens with.
const REQUIREMENT_STARTS: [(&str, &str); 3] = [
    ("📄 以需求模板開始", REQUIREMENT_TEMPLATE),
    ("🐞 以問題回報模板開始", ISSUE_TEMPLATE),
    ("✍️ 空白開始", ""),
];

fn requirement_menu() -> Vec<&'static str> {
    let mut items: Vec<&'static str> = REQUIREMENT_STARTS.iter().map(|(label, _)| *label).collect();
    items.push("🚪 離開");
    items
}

/// Editor seed for the step 1 menu choice; `None` for leaving.
fn requirement_seed(choice: usize) -> Option<&'static str> {
    REQUIREMENT_STARTS.get(choice).map(|(_, seed)| *seed)
}

/// Ask for the next action at `step`. `None` means leave the wizard.
fn ask_action(step: Step) -> Result<Option<Action>> {
    let action = match step {
        Step::Requirement => {
            let choice = choose("如何輸入本輪需求？", &requirement_menu())?;
            let Some(seed) = requirement_seed(choice) else {
                return Ok(None);
            };
            Action::SubmitRequirement(edit::edit(seed).context("無法開啟編輯器")?)
        }
        Step::Architect | Step::Reviewer | Step::Executor => {
            match choose("貼上後，等該窗口完成再繼續", &["✅ 已完成，下一步", "⬅️ 上一步", "🚪 離開"])? {
                0 => Action::Done,
                1 => Action::Back,
                _ => return Ok(None),
            }
        }
        Step::ConfirmReview => {
            match choose(
                "審查員的結論是？",
                &["✅ 審查通過，交給執行者", "✏️ 需要修改，回到架構師", "⬅️ 上一步", "🚪 離開"],
            )? {
                0 => Action::Approve,
                1 => {
                    let note: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt("要轉達給架構師的意見（可留空使用預設指示）")
                        .allow_empty(true)
                        .interact_text()?;
                    Action::Revise(Some(note))
                }
                2 => Action::Back,
                _ => return Ok(None),
            }
        }
        Step::Verify => {
            match choose(
                "照操作清單驗收的結果？",
                &["🎉 全部通過，本輪完成", "❌ 有問題，填寫回報給執行者", "⬅️ 上一步", "🚪 離開"],
            )? {
                0 => Action::Pass,
                1 => Action::ReportIssues(edit::edit(ISSUE_TEMPLATE).context("無法開啟編輯器")?),
                2 => Action::Back,
                _ => return Ok(None),
            }
        }
    };
    Ok(Some(action))
}

fn step_hint(step: Step) -> Option<&'static str> {
    match step {
        Step::Architect => Some(Role::Architect.hint()),
        Step::Reviewer => Some(Role::Reviewer.hint()),
        Step::ConfirmReview => Some(
            "閱讀 _窗口B_審查/REVIEW_本輪.md；審查 OK 時，先在窗口 A 把最終版規格書同步到 _共識/CONSENSUS.md",
        ),
        Step::Executor => Some(Role::Executor.hint()),
        Step::Verify => Some("打開瀏覽器，照 _窗口C_執行/操作清單_本輪.md 逐項檢查"),
        _ => None,
    }
}

async fn save_step(state: &mut WorkflowState, step: Step) -> Result<()> {
    let (_, project) = state.active_project_mut()?;
    project.current_step = step.number();
    state::save_workflow_state(state).await
}

pub async fn handle_wizard() -> Result<()> {
    let mut state = state::load_workflow_state().await?;
    let (name, project) = state.active_project()?;
    let name = name.to_string();
    println!(
        "{}",
        format!("專案「{name}」 第 {} 輪", project.current_round).bold()
    );

    let config = config::load_config().await?;
    let mut clipboard = Clipboard::new(&config);
    let mut wizard = Wizard::new();
    save_step(&mut state, wizard.step()).await?;

    // 上一步剛複製了修改指示或問題回報時，不要用本步驟的指令覆蓋剪貼簿
    let mut keep_clipboard = false;
    loop {
        let step = wizard.step();
        println!();
        println!("{}", "=".repeat(60));
        println!("{}", step.heading().cyan().bold());
        if step != Step::Requirement {
            println!("{}", format!("本輪需求：{}", preview_line(wizard.requirement(), 60)).dimmed());
        }
        if let Some(prompt) = wizard.prompt() {
            if keep_clipboard {
                print_block(&prompt);
            } else {
                clipboard.copy_or_print(&prompt);
            }
        }
        keep_clipboard = false;
        if let Some(hint) = step_hint(step) {
            println!("{}", format!("→ {hint}").bold());
        }

        let Some(action) = ask_action(step)? else {
            break;
        };
        let effect = match wizard.apply(action) {
            Ok(effect) => effect,
            Err(RoundtableError::EmptyText) => {
                println!("{}", "請先輸入需求內容".yellow());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match effect {
            Effect::None => {}
            Effect::Copy(text) => {
                clipboard.copy_or_print(&text);
                keep_clipboard = true;
                if wizard.step() == Step::Executor {
                    println!("{}", "→ 已複製問題回報，貼到窗口 C".bold());
                }
            }
            Effect::CompleteRound => {
                let (_, project) = state.active_project_mut()?;
                let next = workflow::complete_round(project).await;
                println!("{}", format!("🎉 本輪完成！下一輪：第 {next} 輪").green());
            }
        }
        save_step(&mut state, wizard.step()).await?;
    }

    println!("👋 已離開流程精靈，進度停在 {}", wizard.step().heading());
    Ok(())
}
