use asarpick::{AsarPick, AsarPickError, Cli, OutputFormatter, OutputMode, UserFriendlyError};
use clap::Parser;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let asarpick = match AsarPick::from_cli(&cli) {
        Ok(asarpick) => asarpick,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    asarpick.output_formatter().debug(&asarpick::build_info());

    if cli.dry_run {
        return handle_dry_run(&asarpick);
    }

    // Execute main extraction workflow. A completed pass exits 0 even when
    // nothing matched or integrity warnings were collected.
    match asarpick.extract_preloads() {
        Ok(_report) => 0,
        Err(e) => {
            asarpick.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &AsarPickError) -> i32 {
    match error {
        AsarPickError::Config { .. } => 2,
        AsarPickError::SourceNotFound { .. } => 3,
        AsarPickError::MalformedArchive { .. } => 4,
        AsarPickError::Read { .. } | AsarPickError::UnpackedEntry { .. } => 5,
        AsarPickError::Write { .. } => 6,
        AsarPickError::DirectoryCreation { .. } => 7,
        AsarPickError::Cancelled => 130, // Interrupted (SIGINT)
        _ => 1,                          // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "asarpick.toml".to_string());

    match AsarPick::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nUse it with:");
            println!("  asarpick <resources-dir> --config {}", config_path);
            println!("\nEdit it to adjust the defaults.");
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(asarpick: &AsarPick) -> i32 {
    let formatter = asarpick.output_formatter();

    formatter.info("Dry run; nothing will be written");
    formatter.print_separator();

    let config = asarpick.config();
    formatter.info("Effective configuration:");
    println!(
        "  Resources directory: {}",
        config.source.resources_dir.display()
    );
    println!(
        "  Bundle: {}/{}.asar",
        config.source.app_dir, config.source.bundle_name
    );
    println!("  Name filter: {}", config.filters.pattern);
    println!("  Output directory: {}", config.output.directory.display());

    formatter.print_separator();

    match asarpick.preview() {
        Ok(preloads) => {
            formatter.success(&format!(
                "Dry run completed: {} entries would be extracted",
                preloads.len()
            ));
            formatter.info("Run without --dry-run to perform actual extraction");
            0
        }
        Err(e) => {
            asarpick.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

// Errors raised before the configured formatter exists fall back to a
// bare human-mode one.
fn print_startup_error(error: &AsarPickError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
