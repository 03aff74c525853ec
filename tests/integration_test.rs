// tests/integration_test.rs

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

// --- Test Setup Helper ---

struct TestEnv {
    temp_dir: TempDir,
    roundtable_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let roundtable_path = assert_cmd::cargo::cargo_bin("roundtable");
        Self {
            temp_dir,
            roundtable_path,
        }
    }

    /// Disable the system clipboard so copied text is printed instead.
    fn without_clipboard(self) -> Self {
        self.roundtable()
            .args(["prefs", "--clipboard", "false"])
            .assert()
            .success();
        self
    }

    fn with_topic(self, name: &str, members: &[&str]) -> Self {
        self.roundtable()
            .args(["topic", "create", name, "--root"])
            .arg(self.topics_root())
            .assert()
            .success();
        for member in members {
            self.roundtable()
                .args(["member", "add", member])
                .assert()
                .success();
        }
        self
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn topics_root(&self) -> PathBuf {
        self.path().join("topics")
    }

    fn config_dir(&self) -> PathBuf {
        self.path().join("roundtable-home")
    }

    fn roundtable(&self) -> Command {
        let mut cmd = Command::new(&self.roundtable_path);
        cmd.current_dir(self.path());
        cmd.env("ROUNDTABLE_HOME", self.config_dir());
        cmd.env("HOME", self.path());
        cmd.env("USERPROFILE", self.path());
        cmd.env("XDG_CONFIG_HOME", self.path().join(".config"));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.as_ref().display()))
}

// --- Tests ---

#[test]
fn test_init_command() {
    let env = TestEnv::new();
    env.roundtable()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ 已建立預設設定檔:"));
    assert!(env.config_dir().join("config.toml").exists());
}

#[test]
fn test_prefs_round_trip() {
    let env = TestEnv::new();
    env.roundtable()
        .args(["prefs", "--auto-advance", "true", "--only-full-record", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ 設定已儲存"));

    let config = read(env.config_dir().join("config.toml"));
    assert!(config.contains("auto_advance = true"));
    assert!(config.contains("only_full_record = true"));

    // the two output switches exclude each other
    env.roundtable()
        .args(["prefs", "--no-full-record", "true"])
        .assert()
        .success();
    let config = read(env.config_dir().join("config.toml"));
    assert!(config.contains("no_full_record = true"));
    assert!(config.contains("only_full_record = false"));
}

#[test]
fn test_conflicting_output_switches_are_reset_on_load() {
    let env = TestEnv::new();
    fs::create_dir_all(env.config_dir()).unwrap();
    fs::write(
        env.config_dir().join("config.toml"),
        "[discuss]\nauto_advance = true\nno_full_record = true\nonly_full_record = true\n",
    )
    .unwrap();

    env.roundtable().arg("prefs").assert().success();

    let config = read(env.config_dir().join("config.toml"));
    assert!(config.contains("no_full_record = false"));
    assert!(config.contains("only_full_record = false"));
    // unrelated settings survive the rewrite
    assert!(config.contains("auto_advance = true"));
}

#[test]
fn test_topic_create_writes_member_roster() {
    let env = TestEnv::new().with_topic("架構討論", &["Claude", "Gemini"]);
    let topic = env.topics_root().join("架構討論");
    assert!(topic.is_dir());

    let roster = read(topic.join("AI成員資料.txt"));
    assert!(roster.starts_with("主題：架構討論\n更新時間："));
    assert!(roster.contains("AI 名稱：Claude\n"));
    assert!(roster.contains("AI 名稱：Gemini\n"));

    env.roundtable()
        .args(["member", "remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("已移除 AI 成員: Claude"));
    let roster = read(topic.join("AI成員資料.txt"));
    assert!(!roster.contains("Claude"));

    env.roundtable()
        .args(["topic", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("架構討論"));
}

#[test]
fn test_topic_create_rejects_file_in_the_way() {
    let env = TestEnv::new();
    fs::create_dir_all(env.topics_root()).unwrap();
    fs::write(env.topics_root().join("佔用"), "not a folder").unwrap();

    env.roundtable()
        .args(["topic", "create", "佔用", "--root"])
        .arg(env.topics_root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("目標不是資料夾"));
}

#[test]
fn test_round_requires_topic_and_members() {
    let env = TestEnv::new();
    env.roundtable()
        .args(["round", "new"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("尚未載入主題"));

    let env = env.with_topic("空主題", &[]);
    env.roundtable()
        .args(["round", "new"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("尚未新增任何 AI 成員"));
}

#[test]
fn test_submit_round_writes_records() {
    let env = TestEnv::new().with_topic("報表", &["Claude", "Gemini"]);
    let topic = env.topics_root().join("報表");

    env.roundtable()
        .args(["round", "new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("已建立第1輪"));

    env.roundtable()
        .args([
            "round",
            "submit",
            "--question",
            "要不要改用月報？",
            "--reply",
            "Claude=建議改用月報",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("第1輪 已儲存至"));

    let round = topic.join("第1輪");
    assert_eq!(read(round.join("提問.txt")), "要不要改用月報？");
    let claude = read(round.join("Claude_回覆.txt"));
    assert!(claude.starts_with("AI 名稱：Claude\n輪次：第1輪\n"));
    assert!(claude.ends_with("建議改用月報"));
    assert!(read(round.join("Gemini_回覆.txt")).ends_with("（未填寫）"));

    let full = read(round.join("第1輪_完整紀錄.txt"));
    assert!(full.starts_with("主題：報表\n輪次：第1輪\n時間："));
    assert!(full.contains("【本輪提問】\n要不要改用月報？\n"));
    assert!(full.contains("【Gemini】的回覆\n----------------------------------------\n（未填寫）"));

    let cumulative = read(topic.join("全部討論紀錄（累積）.txt"));
    assert!(cumulative.starts_with("主題：報表  —  全部討論累積紀錄\n"));
    assert!(cumulative.contains("AI 成員：Claude, Gemini\n"));
    assert!(cumulative.contains(&full));

    env.roundtable()
        .args(["round", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("建議改用月報"));
}

#[test]
fn test_submit_unknown_member_fails() {
    let env = TestEnv::new().with_topic("t", &["Claude"]);
    env.roundtable().args(["round", "new"]).assert().success();
    env.roundtable()
        .args(["round", "submit", "--reply", "GPT=hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("找不到 AI 成員「GPT」"));
}

#[test]
fn test_auto_advance_and_only_full_record() {
    let env = TestEnv::new().with_topic("t", &["Claude"]);
    env.roundtable()
        .args(["prefs", "--auto-advance", "true", "--only-full-record", "true"])
        .assert()
        .success();
    env.roundtable().args(["round", "new"]).assert().success();
    env.roundtable()
        .args(["round", "submit", "-q", "q1", "--reply", "Claude=a1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("已進入第2輪"));

    let topic = env.topics_root().join("t");
    assert!(topic.join("第1輪").join("第1輪_完整紀錄.txt").exists());
    assert!(!topic.join("第1輪").join("提問.txt").exists());
    assert!(topic.join("第2輪").is_dir());
}

#[test]
fn test_opening_template_prefills_new_round() {
    let env = TestEnv::new().with_topic("t", &["Claude"]);
    env.roundtable()
        .args(["template", "add", "opening", "--text", "請先讀 <上輪路徑>"])
        .assert()
        .success();
    env.roundtable()
        .args(["template", "activate", "opening", "1"])
        .assert()
        .success();
    env.roundtable().args(["round", "new"]).assert().success();
    env.roundtable().args(["round", "new"]).assert().success();

    let expected = format!("請先讀 「{}」", env.topics_root().join("t").join("第1輪").display());
    env.roundtable()
        .args(["round", "show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_round_path_is_printed_without_clipboard() {
    let env = TestEnv::new()
        .without_clipboard()
        .with_topic("t", &["Claude"]);
    env.roundtable().args(["round", "new"]).assert().success();
    let expected = format!("「{}」", env.topics_root().join("t").join("第1輪").display());
    env.roundtable()
        .args(["round", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_project_workflow() {
    let env = TestEnv::new().without_clipboard();
    let base = env.path().join("work");
    fs::create_dir_all(&base).unwrap();

    env.roundtable()
        .args(["project", "create", "報表系統", "--code", "app", "--extra-c", "src/main.js", "--base"])
        .arg(&base)
        .assert()
        .success()
        .stdout(predicate::str::contains("[資料夾] _窗口A_規劃/歷史"))
        .stdout(predicate::str::contains("[文件] _共識"));

    let root = base.join("報表系統");
    assert!(root.join("_共用文件").join("CLAUDE.md").exists());

    env.roundtable()
        .args(["opening", "c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("你今天是執行工程師。"))
        .stdout(predicate::str::contains("6. @src/main.js"))
        .stdout(predicate::str::contains("→ 貼到窗口 C（執行者）"));

    env.roundtable()
        .arg("launch")
        .assert()
        .success()
        .stdout(predicate::str::contains("copilot --allow-all"));

    env.roundtable()
        .arg("complete")
        .assert()
        .success()
        .stdout(predicate::str::contains("下一輪：第 2 輪"));
    let state = read(root.join("_共用文件").join("PROJECT_STATE.md"));
    assert!(state.contains("## 當前輪次：第 2 輪"));

    // running create again leaves existing documents alone
    env.roundtable()
        .args(["project", "create", "報表系統", "--base"])
        .arg(&base)
        .assert()
        .success()
        .stdout(predicate::str::contains("無需建立"));
}

#[test]
fn test_project_create_requires_existing_base() {
    let env = TestEnv::new();
    env.roundtable()
        .args(["project", "create", "p", "--base"])
        .arg(env.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("路徑不存在"));
}
