//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use stablezip_core::ArchiveReport;
use stablezip_core::ContentDigest;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_creation_result(&self, report: &ArchiveReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.line(&format!(
                "{} Archive created: {}",
                style("✓").green().bold(),
                report.output_path.display()
            ));
        } else {
            self.line(&format!(
                "Archive created: {}",
                report.output_path.display()
            ));
        }

        self.line("");
        self.line(&format!("  Hash:          {}", report.hash()));
        self.line(&format!("  Time:          {}", report.time()));
        self.line(&format!("  Files matched: {}", report.files.len()));
        self.line(&format!("  Entries:       {}", report.entries));
        self.line(&format!(
            "  Archive size:  {}",
            Self::format_size(report.archive_size)
        ));

        if self.verbose {
            self.line(&format!(
                "  Input size:    {}",
                Self::format_size(report.bytes_read)
            ));
            self.line(&format!(
                "  Ratio:         {:.2}x",
                report.compression_ratio()
            ));
            self.line(&format!("  Duration:      {:?}", report.duration));
            for file in &report.files {
                self.line(&format!("    {}", file.display()));
            }
        }

        if report.has_warnings() {
            self.line("");
            for warning in &report.warnings {
                if self.use_colors {
                    self.line(&format!("{} {warning}", style("⚠").yellow().bold()));
                } else {
                    self.line(&format!("Warning: {warning}"));
                }
            }
        }

        Ok(())
    }

    fn format_hash(
        &self,
        path: &Path,
        digest: &ContentDigest,
        matches: Option<bool>,
    ) -> Result<()> {
        // md5sum-compatible line; printed even in quiet mode since it is the result
        let line = format!("{digest}  {}", path.display());
        match matches {
            Some(true) if !self.quiet => {
                if self.use_colors {
                    self.line(&format!("{line} {}", style("OK").green().bold()));
                } else {
                    self.line(&format!("{line} OK"));
                }
            }
            Some(false) if self.use_colors => {
                self.line(&format!("{line} {}", style("MISMATCH").red().bold()));
            }
            Some(false) => self.line(&format!("{line} MISMATCH")),
            _ => self.line(&line),
        }
        Ok(())
    }
}
