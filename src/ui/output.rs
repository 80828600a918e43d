use crate::error::{AsarPickError, UserFriendlyError};
use crate::extractor::{ExtractionProgress, ExtractionReport};
use console::{style, Emoji, StyledObject, Term};
use std::time::Duration;

/// How run output is rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

/// Severity of a single message. Decides the glyph, the color and the
/// stream: errors land on stderr, everything else on stdout.
#[derive(Debug, Clone, Copy)]
enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    fn emoji(self) -> Emoji<'static, 'static> {
        match self {
            Severity::Success => CHECKMARK,
            Severity::Error => CROSS,
            Severity::Warning => WARNING,
            Severity::Info => INFO,
        }
    }

    fn ascii(self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Error => "✗",
            Severity::Warning => "!",
            Severity::Info => "i",
        }
    }

    fn paint(self, text: &str) -> StyledObject<&str> {
        match self {
            Severity::Success => style(text).green().bold(),
            Severity::Error => style(text).red().bold(),
            Severity::Warning => style(text).yellow().bold(),
            Severity::Info => style(text).cyan(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Severity::Success => "SUCCESS",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }

    fn level(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    fn uses_stderr(self) -> bool {
        matches!(self, Severity::Error)
    }
}

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbosity: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors =
            mode == OutputMode::Human && !quiet && Term::stdout().features().colors_supported();

        Self {
            mode,
            use_colors,
            verbosity: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        self.emit(Severity::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Severity::Error, message);
    }

    pub fn warning(&self, message: &str) {
        if self.visible_at(1) {
            self.emit(Severity::Warning, message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.visible_at(1) {
            self.emit(Severity::Info, message);
        }
    }

    pub fn debug(&self, message: &str) {
        if !self.visible_at(2) {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("  {}", style(message).dim());
                } else {
                    println!("  DEBUG: {}", message);
                }
            }
            OutputMode::Json => self.json_message("debug", message),
            OutputMode::Plain => println!("DEBUG: {}", message),
        }
    }

    /// Per-step progress lines ("Creating ...", "Extracting ... to ...").
    /// Printed verbatim, before the step they announce, so an aborted run
    /// shows which step failed. Never styled; the text is the contract.
    pub fn progress(&self, message: &str) {
        if !self.visible_at(0) {
            return;
        }

        match self.mode {
            OutputMode::Human | OutputMode::Plain => println!("{}", message),
            OutputMode::Json => self.json_message("progress", message),
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if !self.visible_at(0) {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}{}", ROCKET, style(operation).bold());
                } else {
                    println!("> {}", operation);
                }
            }
            OutputMode::Json => self.json_message("operation_start", operation),
            OutputMode::Plain => println!("STARTING: {}", operation),
        }
    }

    pub fn print_user_friendly_error(&self, error: &AsarPickError) {
        self.error(&error.user_message());

        let Some(suggestion) = error.suggestion() else {
            return;
        };

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!(
                        "{}{}",
                        INFO,
                        style(format!("Suggestion: {}", suggestion)).cyan()
                    );
                } else {
                    println!("Suggestion: {}", suggestion);
                }
            }
            OutputMode::Json => self.json_line(&serde_json::json!({
                "type": "suggestion",
                "message": suggestion,
            })),
            OutputMode::Plain => println!("SUGGESTION: {}", suggestion),
        }
    }

    pub fn print_extraction_summary(&self, progress: &ExtractionProgress) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(progress),
            OutputMode::Json => self.print_json_summary(progress),
            OutputMode::Plain => self.print_plain_summary(progress),
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => println!(
                "{}",
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            ),
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }

        if self.use_colors {
            println!("{}", style("─".repeat(60)).dim());
        } else {
            println!("{}", "-".repeat(60));
        }
    }

    fn visible_at(&self, level: u8) -> bool {
        !self.quiet && self.verbosity >= level
    }

    fn emit(&self, severity: Severity, message: &str) {
        match self.mode {
            OutputMode::Human => {
                let line = if self.use_colors {
                    format!("{}{}", severity.emoji(), severity.paint(message))
                } else {
                    format!("{} {}", severity.ascii(), message)
                };
                if severity.uses_stderr() {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            }
            OutputMode::Json => self.json_message(severity.level(), message),
            OutputMode::Plain => {
                if severity.uses_stderr() {
                    eprintln!("{}: {}", severity.label(), message);
                } else {
                    println!("{}: {}", severity.label(), message);
                }
            }
        }
    }

    fn json_message(&self, level: &str, message: &str) {
        self.json_line(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));
    }

    fn json_line(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn stat_line(&self, label: &str, value: String) {
        let label = format!("{}:", label);
        if self.use_colors {
            println!("  {:<17}{}", label, style(value).cyan().bold());
        } else {
            println!("  {:<17}{}", label, value);
        }
    }

    fn print_human_summary(&self, progress: &ExtractionProgress) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Preload extraction completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Preload extraction completed!");
        }

        println!();
        self.stat_line("Files extracted", progress.files_processed.to_string());
        self.stat_line("Bytes written", format_bytes(progress.bytes_processed));
        self.stat_line("Time taken", format_duration(progress.elapsed()));
        if !progress.warnings.is_empty() {
            self.stat_line("Warnings", progress.warnings.len().to_string());
        }

        self.print_separator();
    }

    fn print_json_summary(&self, progress: &ExtractionProgress) {
        let summary = serde_json::json!({
            "type": "summary",
            "files_extracted": progress.files_processed,
            "bytes_written": progress.bytes_processed,
            "duration_ms": progress.elapsed().as_millis(),
            "warnings": progress.warnings.len(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, progress: &ExtractionProgress) {
        println!("COMPLETED: Preload extraction");
        println!("Files extracted: {}", progress.files_processed);
        println!("Bytes written: {}", progress.bytes_processed);
        println!("Duration: {:?}", progress.elapsed());
        if !progress.warnings.is_empty() {
            println!("Warnings: {}", progress.warnings.len());
        }
    }

    fn print_human_report(&self, report: &ExtractionReport) {
        println!();
        if self.use_colors {
            println!("{} {}", SPARKLES, style("Extraction Report").bold().cyan());
        } else {
            println!("=== Extraction Report ===");
        }
        println!();

        let layout = if report.bundle_info.packed {
            "packed archive"
        } else {
            "unpacked directory"
        };
        println!("Bundle: {}", report.bundle_info.location);
        println!("Layout: {}", layout);
        println!(
            "Extracted at: {}",
            report.extraction_time.format("%Y-%m-%d %H:%M UTC")
        );
        println!();

        if !report.files.is_empty() {
            println!("Extracted files:");
            for file in &report.files {
                println!("  {} ({})", file.filename, format_bytes(file.size));
            }
            println!();
        }

        if !report.warnings.is_empty() {
            println!("Warnings:");
            for warning in &report.warnings {
                println!("  - {}", warning);
            }
        }
    }

    fn print_plain_report(&self, report: &ExtractionReport) {
        println!("REPORT: Extraction completed");
        println!("Bundle: {}", report.bundle_info.location);
        println!("Files: {}", report.extraction_summary.total_files_processed);
        println!(
            "Size: {} bytes",
            report.extraction_summary.total_bytes_processed
        );
        println!(
            "Duration: {:?}",
            report.extraction_summary.extraction_duration
        );

        if !report.warnings.is_empty() {
            println!("Warnings: {}", report.warnings.len());
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let size = bytes as f64;

    if size < KIB {
        format!("{} B", bytes)
    } else if size < KIB * KIB {
        format!("{:.1} KB", size / KIB)
    } else if size < KIB * KIB * KIB {
        format!("{:.1} MB", size / (KIB * KIB))
    } else {
        format!("{:.1} GB", size / (KIB * KIB * KIB))
    }
}

fn format_duration(duration: Duration) -> String {
    match duration.as_secs() {
        0 => format!("{}ms", duration.as_millis()),
        secs if secs < 60 => format!("{}s", secs),
        secs => format!("{}m {}s", secs / 60, secs % 60),
    }
}
