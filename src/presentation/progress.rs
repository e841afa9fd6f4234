//! Byte progress shown while a response body streams to disk

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Draw on stderr; indicatif hides it by itself when stderr is not a terminal
    Terminal,
    Hidden,
}

impl ProgressMode {
    pub fn from_flag(show: bool) -> Self {
        if show { ProgressMode::Terminal } else { ProgressMode::Hidden }
    }
}

pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// A byte bar when the total is known, otherwise a spinner counting bytes
    pub fn start(total: Option<u64>, mode: ProgressMode) -> Self {
        let bar = match (mode, total) {
            (ProgressMode::Hidden, Some(total)) => {
                let bar = ProgressBar::hidden();
                bar.set_length(total);
                bar
            }
            (ProgressMode::Hidden, None) => ProgressBar::hidden(),
            (ProgressMode::Terminal, Some(total)) => {
                let bar = ProgressBar::new(total);
                bar.set_style(bar_style());
                bar
            }
            (ProgressMode::Terminal, None) => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        Self { bar }
    }

    pub fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Leaves the bar where it stopped, for interrupted or failed transfers
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

/// Two-step bar drawn before reporting a timeout
pub async fn simulate_timeout(mode: ProgressMode) {
    let bar = match mode {
        ProgressMode::Terminal => {
            let bar = ProgressBar::new(100);
            bar.set_style(bar_style());
            bar
        }
        ProgressMode::Hidden => ProgressBar::hidden(),
    };
    bar.inc(50);
    tokio::time::sleep(Duration::from_millis(500)).await;
    bar.inc(50);
    bar.finish();
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_progress_still_counts_bytes() {
        let progress = TransferProgress::start(Some(100), ProgressMode::Hidden);
        progress.advance(40);
        progress.advance(60);
        assert_eq!(progress.position(), 100);
        progress.finish();
    }

    #[test]
    fn templates_are_valid() {
        assert!(ProgressStyle::default_bar().template(BAR_TEMPLATE).is_ok());
        assert!(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE).is_ok());
    }

    #[tokio::test]
    async fn timeout_simulation_completes() {
        simulate_timeout(ProgressMode::Hidden).await;
    }
}
