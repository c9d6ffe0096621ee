use super::ui;
use crate::core::analytics::DashboardView;
use crate::core::refresh::{Confirm, Notice, NoticeLevel, RenderTarget};
use console::Term;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Summary,
    List,
}

/// Holds the latest rendered view until the command is done, then prints it.
///
/// Notices are written to stderr as they arrive.
pub struct TerminalRenderer {
    layout: Layout,
    currency: String,
    latest: Mutex<Option<DashboardView>>,
}

impl TerminalRenderer {
    pub fn new(layout: Layout, currency: &str) -> Self {
        Self {
            layout,
            currency: currency.to_string(),
            latest: Mutex::new(None),
        }
    }

    /// Formats the latest view, if any refresh was applied.
    pub fn output(&self) -> Option<String> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.as_ref().map(|view| match self.layout {
            Layout::Summary => view.display_summary(&self.currency),
            Layout::List => view.display_list(&self.currency),
        })
    }

    pub fn flush(&self) {
        match self.output() {
            Some(output) => {
                ui::print_separator();
                println!("{output}");
            }
            None => debug!("Nothing to render"),
        }
    }
}

impl RenderTarget for TerminalRenderer {
    fn render(&self, view: &DashboardView) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *latest = Some(view.clone());
    }

    fn notify(&self, notice: &Notice) {
        let line = match notice.level {
            NoticeLevel::Info => notice.message.clone(),
            NoticeLevel::Error => ui::style_text(
                &format!("Error: {}", notice.message),
                ui::StyleType::Error,
            ),
        };
        eprintln!("{line}");
    }
}

/// Prompts on the terminal and accepts `y` or `yes`.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let term = Term::stderr();
        if let Err(e) = term.write_str(&format!("{prompt} [y/N] ")) {
            debug!("Failed to write prompt: {}", e);
            return false;
        }
        match term.read_line() {
            Ok(answer) => is_yes(&answer),
            Err(e) => {
                debug!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
