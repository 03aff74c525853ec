pub mod discuss;
pub mod init;
pub mod prefs;
pub mod project;
pub mod round;
pub mod template;
pub mod topic;
pub mod wizard;

use clap::{Parser, Subcommand};

use crate::template::TemplateKind;
use crate::workflow::Role;

/// 協調多個 AI 對話窗口：按輪次記錄討論，並產生三窗口協作流程的指令
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 初始化設定檔
    #[command(alias = "i")]
    Init,

    /// 查看或修改行為設定
    Prefs {
        /// 送出後自動進入下一輪
        #[arg(long)]
        auto_advance: Option<bool>,

        /// 不產生「第N輪_完整紀錄.txt」
        #[arg(long)]
        no_full_record: Option<bool>,

        /// 只產生完整紀錄，不產生個別「_回覆」與「提問.txt」
        #[arg(long)]
        only_full_record: Option<bool>,

        /// 新主題的預設建立位置
        #[arg(long)]
        default_root: Option<String>,

        /// 是否使用系統剪貼簿
        #[arg(long)]
        clipboard: Option<bool>,
    },

    /// 互動式討論紀錄（逐輪填寫提問與各 AI 回覆）
    #[command(alias = "d")]
    Discuss,

    /// 管理討論主題
    #[command(subcommand, alias = "t")]
    Topic(TopicCommand),

    /// 管理目前主題的 AI 成員
    #[command(subcommand, alias = "m")]
    Member(MemberCommand),

    /// 輪次操作
    #[command(subcommand, alias = "r")]
    Round(RoundCommand),

    /// 累積紀錄與資料夾
    #[command(subcommand)]
    Record(RecordCommand),

    /// 管理開場白、結語與罐頭信息
    #[command(subcommand, alias = "tpl")]
    Template(TemplateCommand),

    /// 管理協作流程專案
    #[command(subcommand, alias = "p")]
    Project(ProjectCommand),

    /// 產生窗口開場指令並複製到剪貼簿
    #[command(alias = "o")]
    Opening {
        /// 窗口角色：architect/a、reviewer/b、executor/c、secretary/d
        #[arg(value_enum)]
        role: Role,
    },

    /// 產生進入代碼資料夾並啟動 AI CLI 的指令
    Launch,

    /// 六步驟協作流程精靈
    #[command(alias = "w")]
    Wizard,

    /// 標記目前專案本輪完成，進入下一輪
    Complete,
}

#[derive(Subcommand, Debug)]
pub enum TopicCommand {
    /// 建立或載入主題
    #[command(alias = "new")]
    Create {
        /// 主題名稱
        name: String,

        /// 建立位置（預設為設定中的 default_root 或桌面）
        #[arg(long)]
        root: Option<String>,
    },
    /// 切換到已存在的主題
    Use {
        name: String,
    },
    /// 列出所有主題
    #[command(alias = "ls")]
    List,
    /// 顯示目前主題
    Show,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    /// 新增 AI 成員
    Add {
        /// AI 名稱
        name: String,

        /// 工作資料夾（選填）
        #[arg(long)]
        path: Option<String>,
    },
    /// 移除 AI 成員（名稱或從 1 開始的序號）
    #[command(alias = "rm")]
    Remove {
        member: String,
    },
    /// 列出 AI 成員
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum RoundCommand {
    /// 開始新一輪
    New,
    /// 顯示某一輪（預設為最新一輪）
    Show {
        round: Option<u32>,
    },
    /// 列出所有輪次
    #[command(alias = "ls")]
    List,
    /// 儲存某一輪的提問與回覆（預設為最新一輪）
    Submit {
        round: Option<u32>,

        /// 本輪提問
        #[arg(short, long, conflicts_with = "question_file")]
        question: Option<String>,

        /// 從檔案讀取本輪提問
        #[arg(long)]
        question_file: Option<String>,

        /// AI 回覆，格式為 名稱=內容，可重複
        #[arg(long = "reply", value_name = "NAME=TEXT")]
        replies: Vec<String>,

        /// 從檔案讀取 AI 回覆，格式為 名稱=路徑，可重複
        #[arg(long = "reply-file", value_name = "NAME=PATH")]
        reply_files: Vec<String>,

        /// 未提供的內容以編輯器填寫
        #[arg(short, long)]
        edit: bool,
    },
    /// 複製某一輪的資料夾路徑（以「」框住）
    Path {
        round: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// 重新產生累積紀錄
    Rebuild,
    /// 開啟累積紀錄
    Open,
    /// 開啟主題資料夾
    Folder,
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// 列出所有模板
    #[command(alias = "ls")]
    List,
    /// 新增模板（未提供內容時開啟編輯器）
    Add {
        #[arg(value_enum)]
        kind: TemplateKind,

        /// 名稱（預設為 方案N / 罐頭N）
        #[arg(long)]
        name: Option<String>,

        /// 內容，可使用 <上輪路徑> <本輪路徑> <主題資料夾>
        #[arg(long)]
        text: Option<String>,
    },
    /// 編輯模板（序號從 1 開始）
    Edit {
        #[arg(value_enum)]
        kind: TemplateKind,
        index: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        text: Option<String>,
    },
    /// 刪除模板
    #[command(alias = "rm")]
    Remove {
        #[arg(value_enum)]
        kind: TemplateKind,
        index: usize,
    },
    /// 啟用某個開場白或結語（同類其他方案會被停用）
    Activate {
        #[arg(value_enum)]
        kind: TemplateKind,
        index: usize,
    },
    /// 停用某個開場白或結語
    Deactivate {
        #[arg(value_enum)]
        kind: TemplateKind,
        index: usize,
    },
    /// 解析佔位符後複製罐頭信息
    Canned {
        index: usize,

        /// 以哪一輪解析路徑（預設為最新一輪）
        #[arg(long)]
        round: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// 建立專案資料夾與核心文件
    #[command(alias = "new")]
    Create {
        /// 專案名稱
        name: String,

        /// 專案建立位置（必須已存在）
        #[arg(long)]
        base: String,

        /// 代碼資料夾名稱
        #[arg(long, default_value = "")]
        code: String,

        /// 額外的共用規格檔，以逗號分隔
        #[arg(long, default_value = "")]
        shared: String,

        /// 執行者額外要讀的檔案，以逗號分隔
        #[arg(long, default_value = "")]
        extra_c: String,
    },
    /// 切換目前專案
    Use {
        name: String,
    },
    /// 列出所有專案
    #[command(alias = "ls")]
    List,
    /// 從設定中移除專案（不會刪除實際檔案）
    #[command(alias = "rm")]
    Remove {
        name: String,

        /// 不詢問直接移除
        #[arg(short, long)]
        yes: bool,
    },
    /// 修改專案設定
    Edit {
        name: String,

        #[arg(long)]
        folder: Option<String>,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        round: Option<u32>,

        /// 額外的共用規格檔，以逗號分隔
        #[arg(long)]
        shared: Option<String>,

        /// 執行者額外要讀的檔案，以逗號分隔
        #[arg(long)]
        extra_c: Option<String>,
    },
    /// 複製需求或問題回報模板
    Template {
        #[arg(value_enum, default_value = "requirement")]
        which: ReportTemplate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportTemplate {
    /// 本輪需求
    #[value(alias = "req")]
    Requirement,
    /// 驗收問題回報
    Issue,
}
