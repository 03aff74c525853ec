//! src/errors.rs

use std::path::PathBuf;
use thiserror::Error;

/// 使用者可以自行排除的錯誤，其餘錯誤一律以 anyhow 往上拋。
#[derive(Debug, Error)]
pub enum RoundtableError {
    #[error("尚未載入主題，請先執行 `roundtable topic create <名稱>`")]
    NoActiveTopic,

    #[error("主題「{0}」尚未新增任何 AI 成員，請先執行 `roundtable member add <名稱>`")]
    NoMembers(String),

    #[error("找不到主題「{0}」")]
    UnknownTopic(String),

    #[error("找不到 AI 成員「{0}」")]
    UnknownMember(String),

    #[error("找不到專案「{0}」")]
    UnknownProject(String),

    #[error("尚未選擇專案，請先執行 `roundtable project create` 或 `roundtable project use`")]
    NoActiveProject,

    #[error("建立失敗：目標不是資料夾\n{}", .0.display())]
    NotADirectory(PathBuf),

    #[error("路徑不存在：{}", .0.display())]
    MissingPath(PathBuf),

    #[error("名稱不可為空")]
    EmptyName,

    #[error("內容不可為空")]
    EmptyText,

    #[error("第 {0} 輪不存在")]
    UnknownRound(u32),

    #[error("主題「{0}」尚無任何輪次，請先執行 `roundtable round new`")]
    NoRounds(String),

    #[error("找不到第 {index} 個{kind}")]
    UnknownTemplate { kind: &'static str, index: usize },

    #[error("罐頭信息沒有啟用狀態，只有開場白與結語可以啟用")]
    CannedNotActivatable,

    #[error("參數格式錯誤：{0}（應為 名稱=內容）")]
    BadAssignment(String),
}
