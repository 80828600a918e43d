//! Pulls preload scripts out of packed Electron application bundles.

pub mod cli;
pub mod config;
pub mod error;
pub mod asar;
pub mod bundle;
pub mod scanner;
pub mod extractor;
pub mod ui;

pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, FilterConfig, OutputConfig, SourceConfig};
pub use error::{AsarPickError, Result, UserFriendlyError};

pub use asar::AsarArchive;
pub use bundle::{AppBundle, BundleEntry, BundleInfo};
pub use extractor::{
    ConfigSnapshot, ExtractionProgress, ExtractionReport, FileOperations, OutputManager,
};
pub use scanner::{BundleScanner, NameFilter, PreloadFile, ScanStatistics};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// One configured extraction run. Holds the formatter, the progress
/// draw target and the interrupt flag for the whole pass.
pub struct AsarPick {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl AsarPick {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Skips signal handler registration, which is once-per-process.
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbose,
            cli_args.quiet,
        )
    }

    /// Run one complete extraction pass over the application bundle.
    ///
    /// The output directory is ensured first, then the bundle is opened and
    /// its root entries filtered by name. A pass that copies nothing is still
    /// a completed pass. The first failed step aborts the run; files already
    /// copied stay in place.
    pub fn extract_preloads(&self) -> Result<ExtractionReport> {
        self.shutdown.check_shutdown()?;

        self.output_formatter
            .start_operation("Extracting preload scripts");

        // Step 1: Ensure the output directory exists
        let output_manager = self.setup_output_directory()?;
        self.shutdown.check_shutdown()?;

        // Step 2: Open the application bundle
        let bundle = self.open_bundle()?;
        self.shutdown.check_shutdown()?;

        // Step 3: Scan root entries for matching names
        let preloads = self.scan_bundle(&bundle)?;
        self.shutdown.check_shutdown()?;

        // Step 4: Copy the matches
        let extraction_progress = if preloads.is_empty() {
            self.output_formatter.info(&format!(
                "No entries matching '{}' found in {}",
                self.config.filters.pattern,
                bundle.location().display()
            ));
            ExtractionProgress::new(0, 0)
        } else {
            self.extract_files(&bundle, &preloads, output_manager.get_output_directory())?
        };

        // Step 5: Assemble the report
        let config_snapshot = self.create_config_snapshot();
        let report = output_manager.create_extraction_report(
            &bundle.info(),
            &preloads,
            &extraction_progress,
            &config_snapshot,
        );

        for warning in &extraction_progress.warnings {
            self.output_formatter.warning(warning);
        }

        match self.output_formatter.mode() {
            OutputMode::Json => self.output_formatter.print_extraction_report(&report),
            _ => self
                .output_formatter
                .print_extraction_summary(&extraction_progress),
        }

        Ok(report)
    }

    /// List what a run would copy, without touching the filesystem.
    pub fn preview(&self) -> Result<Vec<PreloadFile>> {
        self.shutdown.check_shutdown()?;

        let bundle = self.open_bundle()?;
        let preloads = self.scan_bundle(&bundle)?;

        for file in &preloads {
            self.output_formatter.progress(&format!(
                "Would extract {} to {}",
                file.source_path.display(),
                self.config.output.directory.join(&file.name).display()
            ));
        }

        Ok(preloads)
    }

    /// Ensure the output directory exists, announcing creation first
    fn setup_output_directory(&self) -> Result<OutputManager> {
        let output_manager = OutputManager::new(self.config.output.directory.clone());

        if output_manager.needs_creation() {
            self.output_formatter.progress(&format!(
                "Creating {}...",
                output_manager.get_output_directory().display()
            ));
        }

        output_manager.initialize()?;
        Ok(output_manager)
    }

    /// Locate and open the application bundle
    fn open_bundle(&self) -> Result<AppBundle> {
        let spinner = self
            .progress_manager
            .create_spinner("Opening application bundle...");

        let bundle = AppBundle::locate(
            &self.config.source.resources_dir,
            &self.config.source.app_dir,
            &self.config.source.bundle_name,
        );
        spinner.finish_and_clear();
        let bundle = bundle?;

        self.output_formatter.debug(&format!(
            "Bundle found at {}",
            bundle.location().display()
        ));

        Ok(bundle)
    }

    /// Scan bundle root entries for names containing the filter pattern
    fn scan_bundle(&self, bundle: &AppBundle) -> Result<Vec<PreloadFile>> {
        let scanner = BundleScanner::new(&self.config.filters);
        let preloads = scanner.scan(bundle)?;

        let stats = scanner.get_statistics(&preloads);
        self.output_formatter.debug(&stats.display_summary());

        self.output_formatter
            .info(&format!("Found {} preload entries", preloads.len()));

        Ok(preloads)
    }

    /// Copy files with progress tracking, announcing each copy before it runs
    fn extract_files(
        &self,
        bundle: &AppBundle,
        preloads: &[PreloadFile],
        output_dir: &Path,
    ) -> Result<ExtractionProgress> {
        let file_progress = self
            .progress_manager
            .create_file_progress(preloads.len() as u64);

        let progress_callback = {
            let pb = file_progress.clone();
            let formatter = &self.output_formatter;
            let manager = &self.progress_manager;
            move |progress: &ExtractionProgress| {
                if let Some(ref step) = progress.current {
                    manager.suspend(|| {
                        formatter.progress(&format!(
                            "Extracting {} to {}",
                            step.source.display(),
                            step.dest.display()
                        ));
                    });
                }
                ui::progress::update_file_progress(&pb, progress);
            }
        };

        let file_ops = FileOperations::new();
        let extraction_progress =
            file_ops.extract_files(bundle, preloads, output_dir, Some(&progress_callback))?;

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Extracted {} files", extraction_progress.files_processed),
            extraction_progress.elapsed(),
        );

        Ok(extraction_progress)
    }

    fn create_config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            pattern: self.config.filters.pattern.clone(),
            resources_dir: self.config.source.resources_dir.display().to_string(),
            output_directory: self.config.output.directory.display().to_string(),
        }
    }

    /// Write an annotated sample configuration to `output_path`.
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(AsarPickError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Prints the error with its suggestion through the run's formatter.
    pub fn handle_error(&self, error: &AsarPickError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// One-call extraction with default configuration, for embedding.
pub fn extract_preloads_simple(
    resources_dir: Option<&Path>,
    output_dir: Option<&Path>,
    verbose: bool,
) -> Result<ExtractionReport> {
    let mut config = Config::default();

    if let Some(resources) = resources_dir {
        config.source.resources_dir = resources.to_path_buf();
    }

    if let Some(output) = output_dir {
        config.output.directory = output.to_path_buf();
    }

    let asarpick = AsarPick::new(config, OutputMode::Human, if verbose { 1 } else { 0 }, false)?;

    asarpick.extract_preloads()
}

/// One-line build identification, shown at -vv.
pub fn build_info() -> String {
    format!(
        "asarpick {} ({}, built {}) on {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown"),
        option_env!("BUILD_DATE").unwrap_or("unknown"),
        std::env::consts::ARCH,
    )
}
