// UI layer: the driver that runs the liveness check and the enabled
// scenarios, plus the small terminal helpers they share (report sink and
// spinner). Output goes to any `Write` so the whole run can be captured.

use crate::api::ParseClient;
use crate::config::ExerciserConfig;
use crate::scenarios;
use crossterm::style::{Color, Stylize};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;
use tracing::warn;

const RULE_WIDTH: usize = 60;

/// Line-oriented sink for operator-facing output. Plain text unless
/// `styled` is switched on, which only makes sense for a terminal.
pub struct Report<'a> {
    out: &'a mut dyn Write,
    styled: bool,
}

impl<'a> Report<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Report { out, styled: false }
    }

    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    fn mark(&self, text: &str, color: Color) -> String {
        if self.styled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write one line. Output is best effort: a broken sink must not turn
    /// into a scenario failure.
    pub fn line(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "{}", text);
    }

    pub fn rule(&mut self) {
        self.line("=".repeat(RULE_WIDTH));
    }

    pub fn status_ok(&mut self) {
        self.line("Status code: 200");
    }

    pub fn success(&mut self, text: impl Display) {
        let mark = self.mark("✓", Color::Green);
        self.line(format!("{} {}", mark, text));
    }

    pub fn failure(&mut self, text: impl Display) {
        let mark = self.mark("✗", Color::Red);
        self.line(format!("{} {}", mark, text));
    }

    pub fn warning(&mut self, text: impl Display) {
        let mark = self.mark("Warning:", Color::Yellow);
        self.line(format!("{} {}", mark, text));
    }

    pub fn error(&mut self, text: impl Display) {
        let mark = self.mark("Error:", Color::Red);
        self.line(format!("{} {}", mark, text));
    }
}

/// Run `f` while a spinner ticks on stderr. indicatif hides the spinner
/// when stderr is not a terminal.
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    let result = f();
    spinner.finish_and_clear();
    result
}

/// Probe `/docs` and report the outcome. Returns whether the server is up.
pub fn check_server_status(
    client: &ParseClient,
    config: &ExerciserConfig,
    report: &mut Report,
) -> bool {
    if client.is_alive(config.liveness_timeout) {
        report.success("API server is running");
        return true;
    }
    report.failure("API server is not running or cannot be reached");
    report.line(format!("  Start the server first: {}", config.server_hint()));
    false
}

/// Banner, liveness check, every enabled scenario, closing banner.
///
/// Returns `false` when the liveness check failed and nothing else ran.
/// Scenario failures are printed and never stop the run.
pub fn run_all(client: &ParseClient, config: &ExerciserConfig, report: &mut Report) -> bool {
    report.rule();
    report.line("MinerU FastAPI /file_parse API test");
    report.rule();

    if !check_server_status(client, config, report) {
        return false;
    }

    for &scenario in &config.enabled {
        report.line(format!("\n=== {} ===", scenario.title()));
        if let Err(e) = scenarios::run(scenario, client, config, report) {
            warn!(?scenario, error = %e, "scenario failed");
            report.error(e);
        }
    }

    report.line("");
    report.rule();
    report.line("Tests finished");
    report.rule();
    true
}
