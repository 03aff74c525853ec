//! src/template.rs
//!
//! 開場白、結語與罐頭信息。開場白與結語各自最多只有一個啟用方案，新一輪的提問
//! 會自動帶入啟用中的方案；罐頭信息則是隨時可插入提問的片段。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::RoundtableError;
use crate::paths::quote;
use crate::record::round_dir;

pub const PLACEHOLDER_PREV_ROUND: &str = "<上輪路徑>";
pub const PLACEHOLDER_THIS_ROUND: &str = "<本輪路徑>";
pub const PLACEHOLDER_TOPIC: &str = "<主題資料夾>";

/// 開場白與結語之間的分隔。
const OPENING_CLOSING_GAP: &str = "\n\n\n";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TemplateItem {
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CannedItem {
    pub name: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TemplateKind {
    Opening,
    Closing,
    Canned,
}

impl TemplateKind {
    pub fn label(self) -> &'static str {
        match self {
            TemplateKind::Opening => "開場白",
            TemplateKind::Closing => "結語",
            TemplateKind::Canned => "罐頭信息",
        }
    }

    fn default_name_prefix(self) -> &'static str {
        match self {
            TemplateKind::Opening | TemplateKind::Closing => "方案",
            TemplateKind::Canned => "罐頭",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Templates {
    #[serde(default)]
    pub openings: Vec<TemplateItem>,
    #[serde(default)]
    pub closings: Vec<TemplateItem>,
    #[serde(default)]
    pub canned: Vec<CannedItem>,
    #[serde(default)]
    pub use_opening: bool,
    #[serde(default)]
    pub use_closing: bool,
}

fn has_usable(items: &[TemplateItem]) -> bool {
    items.iter().any(|it| it.active && !it.text.is_empty())
}

fn first_active(items: &[TemplateItem]) -> Option<&TemplateItem> {
    items.iter().find(|it| it.active)
}

impl Templates {
    pub fn count(&self, kind: TemplateKind) -> usize {
        match kind {
            TemplateKind::Opening => self.openings.len(),
            TemplateKind::Closing => self.closings.len(),
            TemplateKind::Canned => self.canned.len(),
        }
    }

    /// Append an item. A blank name becomes `方案N` / `罐頭N`.
    pub fn add(&mut self, kind: TemplateKind, name: &str, text: &str) -> Result<usize, RoundtableError> {
        let text = text.trim_end_matches('\n');
        if text.trim().is_empty() {
            return Err(RoundtableError::EmptyText);
        }
        let name = match name.trim() {
            "" => format!("{}{}", kind.default_name_prefix(), self.count(kind) + 1),
            n => n.to_string(),
        };
        let text = text.to_string();
        match kind {
            TemplateKind::Opening => self.openings.push(TemplateItem { name, text, active: false }),
            TemplateKind::Closing => self.closings.push(TemplateItem { name, text, active: false }),
            TemplateKind::Canned => self.canned.push(CannedItem { name, text }),
        }
        Ok(self.count(kind) - 1)
    }

    fn fields_mut(&mut self, kind: TemplateKind, index: usize) -> Option<(&mut String, &mut String)> {
        match kind {
            TemplateKind::Opening => self.openings.get_mut(index).map(|it| (&mut it.name, &mut it.text)),
            TemplateKind::Closing => self.closings.get_mut(index).map(|it| (&mut it.name, &mut it.text)),
            TemplateKind::Canned => self.canned.get_mut(index).map(|it| (&mut it.name, &mut it.text)),
        }
    }

    /// Replace name and/or text of an existing item.
    pub fn edit(
        &mut self,
        kind: TemplateKind,
        index: usize,
        name: Option<&str>,
        text: Option<&str>,
    ) -> Result<(), RoundtableError> {
        let text = match text.map(|t| t.trim_end_matches('\n')) {
            Some(t) if t.trim().is_empty() => return Err(RoundtableError::EmptyText),
            other => other,
        };
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let (item_name, item_text) =
            self.fields_mut(kind, index)
                .ok_or(RoundtableError::UnknownTemplate {
                    kind: kind.label(),
                    index: index + 1,
                })?;
        if let Some(name) = name {
            *item_name = name.to_string();
        }
        if let Some(text) = text {
            *item_text = text.to_string();
        }
        Ok(())
    }

    pub fn remove(&mut self, kind: TemplateKind, index: usize) -> Result<String, RoundtableError> {
        let name = match kind {
            TemplateKind::Opening if index < self.openings.len() => self.openings.remove(index).name,
            TemplateKind::Closing if index < self.closings.len() => self.closings.remove(index).name,
            TemplateKind::Canned if index < self.canned.len() => self.canned.remove(index).name,
            _ => {
                return Err(RoundtableError::UnknownTemplate {
                    kind: kind.label(),
                    index: index + 1,
                })
            }
        };
        self.sync_switches();
        Ok(name)
    }

    /// Activate one opening/closing (deactivating the rest) or deactivate it.
    /// The kind's master switch follows whether any usable item is active.
    pub fn set_active(&mut self, kind: TemplateKind, index: usize, active: bool) -> Result<(), RoundtableError> {
        let items = match kind {
            TemplateKind::Opening => &mut self.openings,
            TemplateKind::Closing => &mut self.closings,
            TemplateKind::Canned => return Err(RoundtableError::CannedNotActivatable),
        };
        if index >= items.len() {
            return Err(RoundtableError::UnknownTemplate {
                kind: kind.label(),
                index: index + 1,
            });
        }
        if active {
            for (i, item) in items.iter_mut().enumerate() {
                item.active = i == index;
            }
        } else {
            items[index].active = false;
        }
        self.sync_switches();
        Ok(())
    }

    fn sync_switches(&mut self) {
        self.use_opening = has_usable(&self.openings);
        self.use_closing = has_usable(&self.closings);
    }

    /// A switch that is on without an active, non-empty item is turned off.
    /// Returns the kinds that were switched off.
    pub fn normalize_switches(&mut self) -> Vec<TemplateKind> {
        let mut changed = Vec::new();
        if self.use_opening && !has_usable(&self.openings) {
            self.use_opening = false;
            changed.push(TemplateKind::Opening);
        }
        if self.use_closing && !has_usable(&self.closings) {
            self.use_closing = false;
            changed.push(TemplateKind::Closing);
        }
        changed
    }

    pub fn active_opening(&self, ctx: &PlaceholderContext<'_>) -> Option<String> {
        first_active(&self.openings).map(|it| ctx.resolve(&it.text))
    }

    pub fn active_closing(&self, ctx: &PlaceholderContext<'_>) -> Option<String> {
        first_active(&self.closings).map(|it| ctx.resolve(&it.text))
    }

    /// Initial question text for a round that has nothing saved yet.
    pub fn compose_question(&self, ctx: &PlaceholderContext<'_>) -> String {
        let mut text = String::new();
        if self.use_opening {
            if let Some(opening) = self.active_opening(ctx).filter(|s| !s.is_empty()) {
                text.push_str(&opening);
            }
        }
        if self.use_closing {
            if let Some(closing) = self.active_closing(ctx).filter(|s| !s.is_empty()) {
                if !text.is_empty() {
                    text.push_str(OPENING_CLOSING_GAP);
                }
                text.push_str(&closing);
            }
        }
        text
    }

    pub fn canned_text(&self, index: usize, ctx: &PlaceholderContext<'_>) -> Result<String, RoundtableError> {
        self.canned
            .get(index)
            .map(|c| ctx.resolve(&c.text))
            .ok_or(RoundtableError::UnknownTemplate {
                kind: TemplateKind::Canned.label(),
                index: index + 1,
            })
    }
}

/// What the path placeholders resolve against.
pub struct PlaceholderContext<'a> {
    pub topic_dir: Option<&'a Path>,
    pub round: u32,
}

impl PlaceholderContext<'_> {
    /// Replace `<上輪路徑>`, `<本輪路徑>` and `<主題資料夾>`. Without a topic
    /// they resolve to empty text.
    pub fn resolve(&self, text: &str) -> String {
        let (prev, this, topic) = match self.topic_dir {
            Some(dir) => (
                quote(&round_dir(dir, self.round.saturating_sub(1).max(1))),
                quote(&round_dir(dir, self.round)),
                quote(dir),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        text.replace(PLACEHOLDER_PREV_ROUND, &prev)
            .replace(PLACEHOLDER_THIS_ROUND, &this)
            .replace(PLACEHOLDER_TOPIC, &topic)
    }
}

/// One-line preview of a template body for listings.
pub fn preview_line(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let mut chars = flat.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(dir: &Path, round: u32) -> PlaceholderContext<'_> {
        PlaceholderContext {
            topic_dir: Some(dir),
            round,
        }
    }

    #[test]
    fn resolves_placeholders() {
        let dir = Path::new("/topics/t");
        let text = "上輪 <上輪路徑> 本輪 <本輪路徑> 主題 <主題資料夾>";
        assert_eq!(
            ctx(dir, 3).resolve(text),
            "上輪 「/topics/t/第2輪」 本輪 「/topics/t/第3輪」 主題 「/topics/t」"
        );
        assert!(ctx(dir, 1).resolve("<上輪路徑>").contains("第1輪"));

        let none = PlaceholderContext {
            topic_dir: None,
            round: 2,
        };
        assert_eq!(none.resolve("a<本輪路徑>b<主題資料夾>"), "ab");
    }

    #[test]
    fn add_rejects_empty_and_names_defaults() {
        let mut t = Templates::default();
        assert!(matches!(
            t.add(TemplateKind::Opening, "x", "  \n"),
            Err(RoundtableError::EmptyText)
        ));
        assert_eq!(t.add(TemplateKind::Opening, "", "hello\n").unwrap(), 0);
        assert_eq!(t.openings[0].name, "方案1");
        assert_eq!(t.openings[0].text, "hello");
        t.add(TemplateKind::Canned, "", "snippet").unwrap();
        assert_eq!(t.canned[0].name, "罐頭1");
    }

    #[test]
    fn activation_is_exclusive_and_drives_switch() {
        let mut t = Templates::default();
        t.add(TemplateKind::Closing, "a", "A").unwrap();
        t.add(TemplateKind::Closing, "b", "B").unwrap();

        t.set_active(TemplateKind::Closing, 0, true).unwrap();
        t.set_active(TemplateKind::Closing, 1, true).unwrap();
        assert!(!t.closings[0].active);
        assert!(t.closings[1].active);
        assert!(t.use_closing);

        t.set_active(TemplateKind::Closing, 1, false).unwrap();
        assert!(!t.use_closing);

        assert!(t.set_active(TemplateKind::Closing, 5, true).is_err());
        assert!(t.set_active(TemplateKind::Canned, 0, true).is_err());
    }

    #[test]
    fn normalize_turns_off_unusable_switches() {
        let mut t = Templates {
            use_opening: true,
            use_closing: true,
            ..Default::default()
        };
        t.closings.push(TemplateItem {
            name: "c".into(),
            text: "bye".into(),
            active: true,
        });
        assert_eq!(t.normalize_switches(), vec![TemplateKind::Opening]);
        assert!(!t.use_opening);
        assert!(t.use_closing);
    }

    #[test]
    fn compose_joins_opening_and_closing() {
        let dir = Path::new("/t");
        let mut t = Templates::default();
        t.add(TemplateKind::Opening, "", "請讀 <上輪路徑>").unwrap();
        t.add(TemplateKind::Closing, "", "謝謝").unwrap();
        assert_eq!(t.compose_question(&ctx(dir, 2)), "");

        t.set_active(TemplateKind::Opening, 0, true).unwrap();
        assert_eq!(t.compose_question(&ctx(dir, 2)), "請讀 「/t/第1輪」");

        t.set_active(TemplateKind::Closing, 0, true).unwrap();
        assert_eq!(t.compose_question(&ctx(dir, 2)), "請讀 「/t/第1輪」\n\n\n謝謝");

        t.use_opening = false;
        assert_eq!(t.compose_question(&ctx(dir, 2)), "謝謝");
    }

    #[test]
    fn remove_and_edit() {
        let mut t = Templates::default();
        t.add(TemplateKind::Canned, "c1", "one").unwrap();
        t.edit(TemplateKind::Canned, 0, Some("新名"), Some("two")).unwrap();
        assert_eq!(t.canned[0].name, "新名");
        assert_eq!(t.canned[0].text, "two");
        assert!(t.edit(TemplateKind::Canned, 0, None, Some(" ")).is_err());
        assert_eq!(t.remove(TemplateKind::Canned, 0).unwrap(), "新名");
        assert!(t.remove(TemplateKind::Canned, 0).is_err());
    }

    #[test]
    fn preview_truncates() {
        assert_eq!(preview_line("ab\ncd", 10), "ab cd");
        assert_eq!(preview_line("abcdef", 3), "abc...");
    }
}
