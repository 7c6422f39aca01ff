//! Shared CLI output formatting with colors, symbols, and the run summary.

use crate::harvest::RunSummary;
use std::io::IsTerminal;

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // Respect NO_COLOR env (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Green checkmark symbol.
    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    /// Red X symbol.
    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    /// Yellow warning symbol.
    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}

/// Format a duration in seconds into human-readable (e.g., "2h 14m").
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let m = secs / 60;
        let s = secs % 60;
        format!("{m}m {s}s")
    } else {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{h}h {m}m")
    }
}

/// Render the end-of-run summary as lines for stderr.
pub fn summary_lines(s: &Styled, summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let status = if summary.failed.is_empty() {
        s.ok_sym()
    } else if summary.succeeded == 0 && summary.pairs > 0 {
        s.fail_sym()
    } else {
        s.warn_sym()
    };

    lines.push(format!(
        "  {status} {} in {}",
        s.bold("Harvest complete"),
        format_duration(summary.elapsed_ms / 1000)
    ));
    lines.push(format!(
        "    Pairs:      {}/{} succeeded",
        summary.succeeded, summary.pairs
    ));
    lines.push(format!("    Records:    {}", summary.records));
    if summary.anomalies > 0 {
        lines.push(format!(
            "    Anomalies:  {}",
            s.yellow(&summary.anomalies.to_string())
        ));
    }
    lines.push(format!("    Output:     {}", summary.output.display()));
    if let Some(run_id) = &summary.run_id {
        lines.push(format!("    Run id:     {}", s.dim(run_id)));
    }

    if !summary.failed.is_empty() {
        lines.push(String::new());
        lines.push(format!("  {}", s.bold("Skipped")));
        for failed in &summary.failed {
            lines.push(format!(
                "    {} {:<8} {}  {}",
                s.warn_sym(),
                failed.symbol,
                failed.date,
                s.dim(&failed.reason)
            ));
        }
    }
    lines
}

/// Print the summary to stderr.
pub fn print_summary(summary: &RunSummary) {
    eprintln!();
    for line in summary_lines(&Styled::new(), summary) {
        eprintln!("{line}");
    }
}

/// Print JSON output to stdout.
pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::FailedPair;
    use std::path::PathBuf;

    fn summary(failed: Vec<FailedPair>) -> RunSummary {
        RunSummary {
            run_id: None,
            pairs: 3,
            succeeded: 3 - failed.len(),
            failed,
            records: 42,
            anomalies: 0,
            output: PathBuf::from("out.csv"),
            elapsed_ms: 95_000,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5), "5s");
        assert_eq!(format_duration(95), "1m 35s");
        assert_eq!(format_duration(8040), "2h 14m");
    }

    #[test]
    fn test_summary_lines_clean_run() {
        let lines = summary_lines(&Styled::plain(), &summary(vec![]));
        assert_eq!(lines[0], "  OK Harvest complete in 1m 35s");
        assert!(lines.iter().any(|l| l.contains("3/3 succeeded")));
        assert!(!lines.iter().any(|l| l.contains("Skipped")));
    }

    #[test]
    fn test_summary_lines_lists_skipped_pairs() {
        let lines = summary_lines(
            &Styled::plain(),
            &summary(vec![FailedPair {
                symbol: "A".to_string(),
                date: "12-02-2024".to_string(),
                reason: "charts not ready".to_string(),
            }]),
        );
        assert!(lines[0].starts_with("  ??"));
        assert!(lines
            .iter()
            .any(|l| l.contains("A ") && l.contains("12-02-2024") && l.contains("charts not ready")));
    }
}
