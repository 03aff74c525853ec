//! The six-step round of the three-window workflow.
//!
//! The wizard is a linear state machine. Each step either produces text for
//! the user to paste into a window, or asks for a decision. Transitions are
//! pure so the interactive command only has to render them.

use crate::errors::RoundtableError;

pub const TOTAL_STEPS: u32 = 6;

pub const REVIEW_REQUEST: &str = "架構師已完成 SPEC_本輪.md，請開始審查。";
pub const EXECUTE_REQUEST: &str =
    "CONSENSUS.md 已更新完成，請開始執行。\n先做「執行前確認」，列出你要改的所有地方，等我說「可以開始」。";
pub const DEFAULT_REVISE_REQUEST: &str = "請根據 _窗口B_審查/REVIEW_本輪.md 的「必須修改」修改規格書。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Requirement,
    Architect,
    Reviewer,
    ConfirmReview,
    Executor,
    Verify,
}

impl Step {
    pub fn number(self) -> u32 {
        match self {
            Step::Requirement => 1,
            Step::Architect => 2,
            Step::Reviewer => 3,
            Step::ConfirmReview => 4,
            Step::Executor => 5,
            Step::Verify => 6,
        }
    }

    pub fn from_number(n: u32) -> Option<Step> {
        match n {
            1 => Some(Step::Requirement),
            2 => Some(Step::Architect),
            3 => Some(Step::Reviewer),
            4 => Some(Step::ConfirmReview),
            5 => Some(Step::Executor),
            6 => Some(Step::Verify),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Requirement => "輸入需求",
            Step::Architect => "貼到窗口 A（架構師）",
            Step::Reviewer => "貼到窗口 B（審查員）",
            Step::ConfirmReview => "確認審查結果",
            Step::Executor => "貼到窗口 C（執行者）",
            Step::Verify => "驗收結果",
        }
    }

    /// `Step 2 / 6：貼到窗口 A（架構師）`
    pub fn heading(self) -> String {
        format!("Step {} / {TOTAL_STEPS}：{}", self.number(), self.title())
    }

    pub fn previous(self) -> Step {
        Step::from_number(self.number().saturating_sub(1)).unwrap_or(Step::Requirement)
    }
}

/// User decisions that move the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Step 1: the requirement text was entered.
    SubmitRequirement(String),
    /// Steps 2, 3, 5: the window finished its work.
    Done,
    /// Step 4: the review asks for changes, optionally with a note for A.
    Revise(Option<String>),
    /// Step 4: the review passed.
    Approve,
    /// Step 6: verification found problems, described in the report.
    ReportIssues(String),
    /// Step 6: everything passed.
    Pass,
    Back,
}

/// Side effects a transition asks the caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Copy(String),
    CompleteRound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    step: Step,
    requirement: String,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: Step::Requirement,
            requirement: String::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn requirement(&self) -> &str {
        &self.requirement
    }

    /// Text to paste at the current step, if the step has one.
    pub fn prompt(&self) -> Option<String> {
        match self.step {
            Step::Architect => Some(architect_prompt(&self.requirement)),
            Step::Reviewer => Some(REVIEW_REQUEST.to_string()),
            Step::Executor => Some(EXECUTE_REQUEST.to_string()),
            _ => None,
        }
    }

    /// Apply `action`. Actions that do not belong to the current step leave
    /// the wizard unchanged.
    pub fn apply(&mut self, action: Action) -> Result<Effect, RoundtableError> {
        use Step::*;

        let effect = match (self.step, action) {
            (_, Action::Back) => {
                self.step = self.step.previous();
                Effect::None
            }
            (Requirement, Action::SubmitRequirement(req)) => {
                let req = req.trim();
                if req.is_empty() {
                    return Err(RoundtableError::EmptyText);
                }
                self.requirement = req.to_string();
                self.step = Architect;
                Effect::None
            }
            (Architect, Action::Done) => {
                self.step = Reviewer;
                Effect::None
            }
            (Reviewer, Action::Done) => {
                self.step = ConfirmReview;
                Effect::None
            }
            (ConfirmReview, Action::Revise(note)) => {
                // back to A with the original requirement kept
                self.step = Architect;
                Effect::Copy(revise_request(note.as_deref()))
            }
            (ConfirmReview, Action::Approve) => {
                self.step = Executor;
                Effect::None
            }
            (Executor, Action::Done) => {
                self.step = Verify;
                Effect::None
            }
            (Verify, Action::ReportIssues(report)) => {
                self.step = Executor;
                match report.trim() {
                    "" => Effect::None,
                    r => Effect::Copy(r.to_string()),
                }
            }
            (Verify, Action::Pass) => {
                self.step = Requirement;
                self.requirement.clear();
                Effect::CompleteRound
            }
            (step, action) => {
                log::debug!("忽略 {step:?} 不接受的動作 {action:?}");
                Effect::None
            }
        };
        Ok(effect)
    }
}

pub fn architect_prompt(requirement: &str) -> String {
    format!("以下是本輪需求，請進行任務評估：\n\n{requirement}")
}

pub fn revise_request(note: Option<&str>) -> String {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) => format!("審查員的意見如下，請修改規格書：\n\n{note}"),
        None => DEFAULT_REVISE_REQUEST.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_walks_six_steps() {
        let mut w = Wizard::new();
        assert_eq!(w.step().heading(), "Step 1 / 6：輸入需求");
        assert_eq!(w.prompt(), None);

        w.apply(Action::SubmitRequirement("  做報表  ".into())).unwrap();
        assert_eq!(w.step(), Step::Architect);
        assert_eq!(
            w.prompt().unwrap(),
            "以下是本輪需求，請進行任務評估：\n\n做報表"
        );

        w.apply(Action::Done).unwrap();
        assert_eq!(w.prompt().unwrap(), REVIEW_REQUEST);
        w.apply(Action::Done).unwrap();
        assert_eq!(w.step(), Step::ConfirmReview);
        w.apply(Action::Approve).unwrap();
        assert_eq!(w.prompt().unwrap(), EXECUTE_REQUEST);
        w.apply(Action::Done).unwrap();
        assert_eq!(w.step(), Step::Verify);

        assert_eq!(w.apply(Action::Pass).unwrap(), Effect::CompleteRound);
        assert_eq!(w.step(), Step::Requirement);
        assert_eq!(w.requirement(), "");
    }

    #[test]
    fn empty_requirement_is_rejected() {
        let mut w = Wizard::new();
        assert!(matches!(
            w.apply(Action::SubmitRequirement(" \n".into())),
            Err(RoundtableError::EmptyText)
        ));
        assert_eq!(w.step(), Step::Requirement);
    }

    #[test]
    fn revise_returns_to_architect_keeping_requirement() {
        let mut w = Wizard::new();
        w.apply(Action::SubmitRequirement("需求".into())).unwrap();
        w.apply(Action::Done).unwrap();
        w.apply(Action::Done).unwrap();

        let effect = w.apply(Action::Revise(Some("第 3 點不清楚".into()))).unwrap();
        assert_eq!(
            effect,
            Effect::Copy("審查員的意見如下，請修改規格書：\n\n第 3 點不清楚".into())
        );
        assert_eq!(w.step(), Step::Architect);
        assert!(w.prompt().unwrap().ends_with("需求"));

        w.apply(Action::Done).unwrap();
        w.apply(Action::Done).unwrap();
        let effect = w.apply(Action::Revise(None)).unwrap();
        assert_eq!(effect, Effect::Copy(DEFAULT_REVISE_REQUEST.into()));
    }

    #[test]
    fn issues_go_back_to_executor() {
        let mut w = Wizard::new();
        w.apply(Action::SubmitRequirement("r".into())).unwrap();
        for action in [Action::Done, Action::Done, Action::Approve, Action::Done] {
            w.apply(action).unwrap();
        }
        let effect = w.apply(Action::ReportIssues("❌ 按鈕壞了".into())).unwrap();
        assert_eq!(effect, Effect::Copy("❌ 按鈕壞了".into()));
        assert_eq!(w.step(), Step::Executor);
    }

    #[test]
    fn back_never_goes_before_step_one() {
        let mut w = Wizard::new();
        w.apply(Action::Back).unwrap();
        assert_eq!(w.step(), Step::Requirement);

        w.apply(Action::SubmitRequirement("r".into())).unwrap();
        w.apply(Action::Done).unwrap();
        w.apply(Action::Back).unwrap();
        assert_eq!(w.step(), Step::Architect);
        assert_eq!(w.requirement(), "r");
    }

    #[test]
    fn foreign_actions_are_ignored() {
        let mut w = Wizard::new();
        assert_eq!(w.apply(Action::Pass).unwrap(), Effect::None);
        assert_eq!(w.step(), Step::Requirement);
    }
}
