use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "asarpick")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract preload scripts from packed Electron applications")]
#[command(
    long_about = "AsarPick opens the application bundle shipped in an Electron resources \
                       directory and copies every preload script it finds into a local \
                       directory for inspection."
)]
#[command(before_help = "📦 AsarPick - Preload Extraction Tool")]
#[command(after_help = "EXAMPLES:\n  \
    asarpick\n  \
    asarpick /opt/MyApp/resources\n  \
    asarpick /opt/MyApp/resources --output scripts --verbose\n  \
    asarpick --filter preload-main --dry-run\n  \
    asarpick --generate-config")]
pub struct Cli {
    /// Electron resources directory containing app/application.asar
    /// (defaults to the current directory)
    #[arg(value_name = "RESOURCES_DIR", env = "ASARPICK_RESOURCES")]
    pub resources: Option<PathBuf>,

    /// Output directory name (defaults to ./preloads)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Substring an entry name must contain to be extracted
    #[arg(
        short,
        long,
        help = "Literal, case-sensitive name filter (default: preload)"
    )]
    pub filter: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    /// How results are rendered on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Increase output detail (-v shows info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence run output (errors still print)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List matches without copying anything
    #[arg(long, help = "Show what would be extracted without writing anything")]
    pub dry_run: bool,

    /// Write a sample configuration file and exit
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output
    Human,
    /// Machine-readable JSON report
    Json,
    /// Uncolored line-oriented text
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;
        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;
        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_resources_dir(self.resources.clone())
            .with_output_dir(self.output.as_deref().map(resolve_output_dir))
            .with_pattern(self.filter.clone())
    }

    pub fn output_mode(&self) -> OutputMode {
        match self.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// A bare name goes under the current directory; anything carrying a
/// separator is taken as a path.
fn resolve_output_dir(name: &str) -> PathBuf {
    if name.contains(['/', '\\']) {
        PathBuf::from(name)
    } else {
        std::env::current_dir().unwrap_or_default().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_cli() -> Cli {
        Cli {
            resources: None,
            output: None,
            filter: None,
            config: None,
            output_format: OutputFormat::Human,
            verbose: 0,
            quiet: false,
            dry_run: false,
            generate_config: false,
        }
    }

    #[test]
    fn test_bare_invocation_uses_defaults() {
        let cli = bare_cli();
        let config = cli.load_config().unwrap();

        assert_eq!(config.source.resources_dir, PathBuf::from("."));
        assert_eq!(config.filters.pattern, "preload");
        assert!(config.output.directory.ends_with("preloads"));
    }

    #[test]
    fn test_relative_output_joins_current_dir() {
        let cli = Cli {
            output: Some("scripts".to_string()),
            ..bare_cli()
        };

        let overrides = cli.create_cli_overrides();
        let output_dir = overrides.output_dir.unwrap();
        assert!(output_dir.is_absolute() || output_dir.starts_with("."));
        assert!(output_dir.ends_with("scripts"));
    }

    #[test]
    fn test_explicit_output_path_kept() {
        let cli = Cli {
            output: Some("/tmp/extracted/preloads".to_string()),
            ..bare_cli()
        };

        let overrides = cli.create_cli_overrides();
        assert_eq!(
            overrides.output_dir.unwrap(),
            PathBuf::from("/tmp/extracted/preloads")
        );
    }

    #[test]
    fn test_filter_override_flows_into_config() {
        let cli = Cli {
            filter: Some("Preload".to_string()),
            ..bare_cli()
        };

        let config = cli.load_config().unwrap();
        assert_eq!(config.filters.pattern, "Preload");
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli {
            verbose: 2,
            ..bare_cli()
        };
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli {
            verbose: 0,
            quiet: true,
            ..bare_cli()
        };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_command_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
