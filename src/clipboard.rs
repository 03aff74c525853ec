//! src/clipboard.rs

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;

/// Session-wide clipboard handle.
///
/// On X11/Wayland the copied text is served by this process, so the handle
/// is kept alive for the whole interactive session instead of being opened
/// per copy.
pub struct Clipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new(config: &Config) -> Self {
        if !config.clipboard.enabled {
            return Self { inner: None };
        }
        let inner = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                log::warn!("無法存取剪貼簿，改為直接輸出: {e}");
                None
            }
        };
        Self { inner }
    }

    fn try_copy(&mut self, text: &str) -> Result<bool> {
        match self.inner.as_mut() {
            Some(cb) => {
                cb.set_text(text.to_string())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Copy `text`, or print it between rules when no clipboard is available
    /// so it can be copied by hand.
    pub fn copy_or_print(&mut self, text: &str) {
        match self.try_copy(text) {
            Ok(true) => {
                println!("{}", "📋 已複製到剪貼簿 ✔".green());
                return;
            }
            Ok(false) => {}
            Err(e) => log::warn!("複製到剪貼簿失敗: {e}"),
        }

        print_block(text);
        println!("{}", "（剪貼簿不可用，請手動複製上方內容）".yellow());
    }
}

pub fn print_block(text: &str) {
    println!("{}", "=".repeat(60));
    println!("{text}");
    println!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_clipboard_prints_instead() {
        let mut config = Config::default();
        config.clipboard.enabled = false;
        let mut clipboard = Clipboard::new(&config);
        assert!(clipboard.inner.is_none());
        assert!(!clipboard.try_copy("文字").unwrap());
        clipboard.copy_or_print("文字");
    }
}
