//! Three-window collaboration workflow: project scaffolding, role openings
//! and round bookkeeping.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::errors::RoundtableError;

pub mod prompts;
pub mod wizard;

use prompts::fill;

pub const SHARED_DIR: &str = "_共用文件";
pub const CONSENSUS_DIR: &str = "_共識";
pub const PROJECT_STATE_FILE: &str = "PROJECT_STATE.md";

/// 專案骨架的子資料夾，依建立順序排列。
const PROJECT_DIRS: [&str; 6] = [
    SHARED_DIR,
    "_窗口A_規劃",
    "_窗口A_規劃/歷史",
    "_窗口B_審查",
    "_窗口C_執行",
    CONSENSUS_DIR,
];

/// 已經出現在架構師開場指令中的共用文件，額外清單會略過它們。
const CORE_SHARED_FILES: [&str; 5] = [
    "CLAUDE.md",
    "AI_常見錯誤備忘.md",
    PROJECT_STATE_FILE,
    "AI_執行前核對清單.md",
    "DECISIONS.md",
];

lazy_static! {
    static ref CURRENT_ROUND_LINE: Regex = Regex::new(r"## 當前輪次：第 \d+ 輪").unwrap();
    static ref LAST_UPDATED_LINE: Regex = Regex::new(r"最後更新：.*").unwrap();
}

fn default_round() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Project {
    pub folder: String,
    #[serde(default)]
    pub code_folder: String,
    #[serde(default = "default_round")]
    pub current_round: u32,
    #[serde(default = "default_round")]
    pub current_step: u32,
    #[serde(default)]
    pub shared_files: Vec<String>,
    #[serde(default)]
    pub extra_a_files: Vec<String>,
    #[serde(default)]
    pub extra_b_files: Vec<String>,
    #[serde(default)]
    pub extra_c_files: Vec<String>,
}

impl Project {
    pub fn new(folder: &Path, code_folder: &str) -> Self {
        Self {
            folder: folder.display().to_string(),
            code_folder: code_folder.trim().to_string(),
            current_round: 1,
            current_step: 1,
            shared_files: Vec::new(),
            extra_a_files: Vec::new(),
            extra_b_files: Vec::new(),
            extra_c_files: Vec::new(),
        }
    }

    pub fn folder(&self) -> PathBuf {
        PathBuf::from(&self.folder)
    }

    /// Where the code lives: the code subfolder when set, else the project.
    pub fn code_path(&self) -> PathBuf {
        match self.code_folder.trim() {
            "" => self.folder(),
            code => self.folder().join(code),
        }
    }

    pub fn state_file(&self) -> PathBuf {
        self.folder().join(SHARED_DIR).join(PROJECT_STATE_FILE)
    }
}

/// Split a comma separated list typed by the user.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', '，'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The four AI windows of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    /// 窗口 A：架構師
    #[value(alias = "a")]
    Architect,
    /// 窗口 B：審查員
    #[value(alias = "b")]
    Reviewer,
    /// 窗口 C：執行者
    #[value(alias = "c")]
    Executor,
    /// 窗口 D：秘書
    #[value(alias = "d")]
    Secretary,
}

impl Role {
    pub fn hint(self) -> &'static str {
        match self {
            Role::Architect => "貼到窗口 A（架構師）",
            Role::Reviewer => "貼到窗口 B（審查員）",
            Role::Executor => "貼到窗口 C（執行者）",
            Role::Secretary => "貼到窗口 D（秘書）",
        }
    }
}

/// Opening instructions pasted into a role's window at the start of a
/// session.
pub fn role_opening(role: Role, project: &Project, shared: &str) -> String {
    match role {
        Role::Architect => {
            let extra_a: String = project
                .shared_files
                .iter()
                .enumerate()
                .filter(|(_, f)| !CORE_SHARED_FILES.contains(&f.as_str()))
                .map(|(i, f)| format!("\n{}. @{shared}/{f}", i + 4))
                .collect();
            fill(
                prompts::ARCHITECT_OPENING,
                &[("iron_rules", prompts::IRON_RULES), ("shared", shared), ("extra_a_files", &extra_a)],
            )
        }
        Role::Reviewer => fill(
            prompts::REVIEWER_OPENING,
            &[("iron_rules", prompts::IRON_RULES), ("shared", shared)],
        ),
        Role::Executor => {
            let extra_c: String = project
                .extra_c_files
                .iter()
                .enumerate()
                .map(|(i, f)| format!("\n{}. @{f}", i + 6))
                .collect();
            fill(
                prompts::EXECUTOR_OPENING,
                &[("iron_rules", prompts::IRON_RULES), ("shared", shared), ("extra_c_files", &extra_c)],
            )
        }
        Role::Secretary => fill(
            prompts::SECRETARY_OPENING,
            &[("iron_rules", prompts::IRON_RULES), ("shared", shared)],
        ),
    }
}

/// Shell commands that open the AI CLI inside the code folder.
pub fn launch_command(project: &Project, cli_command: &str) -> String {
    format!("cd \"{}\"\n{}", project.code_path().display(), cli_command)
}

/// One item created by `create_project`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    Dir(String),
    File(String),
}

impl std::fmt::Display for Created {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Created::Dir(d) => write!(f, "[資料夾] {d}"),
            Created::File(p) => write!(f, "[文件] {p}"),
        }
    }
}

/// Create the project skeleton under `base/name`. Existing folders and
/// documents are left untouched. Returns the project root and what was
/// created.
pub async fn create_project(base: &Path, name: &str, code_folder: &str) -> Result<(PathBuf, Vec<Created>)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RoundtableError::EmptyName.into());
    }
    if !base.is_dir() {
        return Err(RoundtableError::MissingPath(base.to_path_buf()).into());
    }

    let root = base.join(name);
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let mut created = Vec::new();

    for dir in PROJECT_DIRS {
        let path = root.join(dir);
        if !path.exists() {
            fs::create_dir_all(&path)
                .await
                .with_context(|| format!("無法建立資料夾 {}", path.display()))?;
            created.push(Created::Dir(dir.to_string()));
        }
    }

    let shared = root.join(SHARED_DIR);
    let code_folder = code_folder.trim();
    let files = [
        (shared.join("CLAUDE.md"), fill(prompts::CLAUDE_MD, &[("project_name", name), ("code_folder", code_folder), ("date", &date)])),
        (shared.join("AI_常見錯誤備忘.md"), fill(prompts::ERROR_MEMO, &[("project_name", name)])),
        (shared.join("AI_執行前核對清單.md"), fill(prompts::CHECKLIST, &[("project_name", name)])),
        (shared.join("DECISIONS.md"), fill(prompts::DECISIONS, &[("project_name", name)])),
        (shared.join(PROJECT_STATE_FILE), fill(prompts::PROJECT_STATE, &[("project_name", name), ("date", &date)])),
        (root.join(CONSENSUS_DIR).join("CONSENSUS.md"), fill(prompts::CONSENSUS, &[("project_name", name)])),
    ];
    for (path, content) in files {
        if path.exists() {
            continue;
        }
        fs::write(&path, content)
            .await
            .with_context(|| format!("無法寫入 {}", path.display()))?;
        let rel = path.strip_prefix(&root).unwrap_or(&path);
        created.push(Created::File(rel.display().to_string()));
    }

    Ok((root, created))
}

/// Rewrite the round and timestamp lines of `PROJECT_STATE.md`.
pub fn update_state_text(content: &str, round: u32, date: &str) -> String {
    let content = CURRENT_ROUND_LINE.replace_all(content, format!("## 當前輪次：第 {round} 輪").as_str());
    LAST_UPDATED_LINE
        .replace_all(&content, format!("最後更新：{date}").as_str())
        .into_owned()
}

/// Advance the project to its next round and refresh `PROJECT_STATE.md`.
/// The state file is best effort: a missing or unwritable file is logged and
/// the round still advances.
pub async fn complete_round(project: &mut Project) -> u32 {
    project.current_round += 1;
    project.current_step = 1;

    let path = project.state_file();
    if !path.exists() {
        log::debug!("{} 不存在，略過更新", path.display());
        return project.current_round;
    }
    let date = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let result = async {
        let content = fs::read_to_string(&path).await?;
        fs::write(&path, update_state_text(&content, project.current_round, &date)).await
    }
    .await;
    if let Err(e) = result {
        log::warn!("無法更新 {}: {e}", path.display());
    }
    project.current_round
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        let mut p = Project::new(Path::new("/work/報表"), "app");
        p.shared_files = vec!["CLAUDE.md".into(), "視覺樣式規格書.md".into()];
        p.extra_c_files = vec!["src/main.js".into()];
        p
    }

    #[test]
    fn parse_list_accepts_both_commas() {
        assert_eq!(parse_list(" a.md, b.md，c.md ,, "), vec!["a.md", "b.md", "c.md"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn architect_opening_lists_extra_shared_files() {
        let text = role_opening(Role::Architect, &project(), "../_共用文件");
        assert!(text.starts_with(prompts::IRON_RULES));
        assert!(text.contains("你今天是架構師。"));
        assert!(text.contains("1. @../_共用文件/CLAUDE.md"));
        // the second shared file keeps its position-based number
        assert!(text.contains("\n5. @../_共用文件/視覺樣式規格書.md"));
        assert!(!text.contains("4. @../_共用文件/CLAUDE.md"));
    }

    #[test]
    fn executor_opening_numbers_extra_files_from_six() {
        let text = role_opening(Role::Executor, &project(), "../_共用文件");
        assert!(text.contains("5. @_共識/CONSENSUS.md\n\n6. @src/main.js"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn reviewer_and_secretary_substitute_shared() {
        for role in [Role::Reviewer, Role::Secretary] {
            let text = role_opening(role, &project(), "SHARED");
            assert!(text.contains("@SHARED/"));
            assert!(!text.contains("{shared}"));
        }
    }

    #[test]
    fn launch_command_uses_code_folder() {
        let p = project();
        assert_eq!(
            launch_command(&p, "copilot --allow-all"),
            format!("cd \"{}\"\ncopilot --allow-all", Path::new("/work/報表").join("app").display())
        );
        let bare = Project::new(Path::new("/work/x"), "");
        assert!(launch_command(&bare, "c").starts_with("cd \"/work/x\""));
    }

    #[test]
    fn state_text_rewrites_round_and_date() {
        let before = "# 專案狀態\n\n## 當前輪次：第 1 輪\n\n---\n最後更新：2024-01-01\n";
        let after = update_state_text(before, 3, "2024-02-02 10:00");
        assert_eq!(
            after,
            "# 專案狀態\n\n## 當前輪次：第 3 輪\n\n---\n最後更新：2024-02-02 10:00\n"
        );
    }

    #[tokio::test]
    async fn create_project_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (root, created) = create_project(dir.path(), "報表", "app").await.unwrap();
        assert_eq!(root, dir.path().join("報表"));
        assert_eq!(created.len(), 12);
        assert!(created.contains(&Created::Dir("_窗口A_規劃/歷史".to_string())));
        assert!(root.join("_共識/CONSENSUS.md").exists());

        let claude = std::fs::read_to_string(root.join("_共用文件/CLAUDE.md")).unwrap();
        assert!(claude.contains("- 代碼資料夾：app"));

        std::fs::write(root.join("_共用文件/DECISIONS.md"), "mine").unwrap();
        let (_, again) = create_project(dir.path(), "報表", "app").await.unwrap();
        assert!(again.is_empty());
        assert_eq!(
            std::fs::read_to_string(root.join("_共用文件/DECISIONS.md")).unwrap(),
            "mine"
        );
    }

    #[tokio::test]
    async fn create_project_requires_existing_base() {
        let dir = tempfile::tempdir().unwrap();
        let err = create_project(&dir.path().join("missing"), "p", "").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RoundtableError>(),
            Some(RoundtableError::MissingPath(_))
        ));
    }

    #[tokio::test]
    async fn complete_round_updates_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let (root, _) = create_project(dir.path(), "p", "").await.unwrap();
        let mut project = Project::new(&root, "");
        project.current_step = 6;

        assert_eq!(complete_round(&mut project).await, 2);
        assert_eq!(project.current_step, 1);
        let state = std::fs::read_to_string(project.state_file()).unwrap();
        assert!(state.contains("## 當前輪次：第 2 輪"));
    }

    #[tokio::test]
    async fn complete_round_without_state_file_still_advances() {
        let mut project = Project::new(Path::new("/nonexistent/roundtable"), "");
        assert_eq!(complete_round(&mut project).await, 2);
    }
}
