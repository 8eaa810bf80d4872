//! Terminal progress for scope teardown.

use colored::Colorize;
use declarative::{ProgressCallback, TeardownReport, TeardownResult};
use indicatif::{ProgressBar, ProgressStyle};

/// Draws a progress bar while a scope is destroyed and prints each result
/// above it.
pub struct TeardownProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl TeardownProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    fn println(&self, line: String) {
        if self.quiet {
            return;
        }
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl ProgressCallback for TeardownProgress {
    fn on_teardown_start(&mut self, _scope: &str, count: usize) {
        if self.quiet || count == 0 {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        self.bar = Some(bar);
    }

    fn on_instance_start(&mut self, id: &str, _resource_type: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(id.to_string());
        }
    }

    fn on_instance_complete(&mut self, id: &str, result: &TeardownResult) {
        self.println(format!("  {} {}", crate::ui::teardown_result(result), id.bold()));
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_teardown_complete(&mut self, _report: &TeardownReport) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
