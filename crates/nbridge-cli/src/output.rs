//! Terminal streams for `nbridge check`.
//!
//! Diagnostics go to stderr. The summary line and JSON output go to stdout.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::commands::check::CheckSummary;

/// `NO_COLOR` wins over `--color`; anything but `always`/`never` auto-detects.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

pub struct Terminal {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl Terminal {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    /// The diagnostic stream and the data stream
    pub fn streams(&mut self) -> (&mut dyn WriteColor, &mut dyn Write) {
        (&mut self.stderr, &mut self.stdout)
    }

    /// Flush pending diagnostics, then print the summary line
    pub fn summary(&mut self, summary: &CheckSummary) -> io::Result<()> {
        self.stderr.flush()?;
        write_summary(&mut self.stdout, summary)?;
        self.stdout.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stderr.flush()?;
        self.stdout.flush()
    }
}

/// A green `Checked` line, or a red `Failed` line with the error counts
pub fn write_summary(out: &mut dyn WriteColor, summary: &CheckSummary) -> io::Result<()> {
    let (label, color, detail) = if summary.is_ok() {
        ("Checked", Color::Green, format!("{} bridge declaration(s)", summary.checked))
    } else {
        (
            "Failed",
            Color::Red,
            format!(
                "{} of {} bridge declaration(s) with {} error(s)",
                summary.failed, summary.checked, summary.errors
            ),
        )
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", label)?;
    out.reset()?;
    writeln!(out, " {}", detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    fn render(summary: CheckSummary) -> String {
        let mut buffer = Buffer::no_color();
        write_summary(&mut buffer, &summary).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_summary_for_clean_run() {
        let summary = CheckSummary {
            checked: 3,
            failed: 0,
            errors: 0,
        };
        assert_eq!(render(summary), "Checked 3 bridge declaration(s)\n");
    }

    #[test]
    fn test_summary_for_failed_run() {
        let summary = CheckSummary {
            checked: 3,
            failed: 1,
            errors: 2,
        };
        assert_eq!(render(summary), "Failed 1 of 3 bridge declaration(s) with 2 error(s)\n");
    }

    #[test]
    fn test_summary_is_colored_by_outcome() {
        let mut buffer = Buffer::ansi();
        let failed = CheckSummary {
            checked: 1,
            failed: 1,
            errors: 1,
        };
        write_summary(&mut buffer, &failed).unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(text.contains("\x1b[31m"));
        assert!(text.contains("Failed\x1b[0m 1 of 1"));
    }

    #[test]
    fn test_never_flag_disables_color() {
        assert_eq!(resolve_color_choice(Some("never")), ColorChoice::Never);
    }
}
