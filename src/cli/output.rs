//! Output formatting and progress display

use crate::core::video_info::VideoInfo;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Console formatter for download progress and results
pub struct OutputFormatter {
    quiet: bool,
    spinner: Option<ProgressBar>,
}

impl OutputFormatter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            spinner: None,
        }
    }

    /// Show a spinner while the pipeline runs; download sizes are unknown
    /// until the stream starts, so a bar would lie.
    pub fn start_progress(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap();
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    pub fn finish_progress(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.green());
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", message.red());
    }

    /// Print the result record for humans
    pub fn print_video_info(&self, info: &VideoInfo) {
        if self.quiet {
            return;
        }
        println!("{} {}", "Title:".bold(), info.title);
        if let Some(file_path) = &info.file_path {
            println!("{} {}", "Saved to:".bold(), file_path);
        }
        if let Some(duration) = info.duration {
            println!("{} {}s", "Duration:".bold(), duration);
        }
        let audio = if info.has_audio {
            "merged".green()
        } else {
            "none (video only)".yellow()
        };
        println!("{} {}", "Audio:".bold(), audio);
    }
}
