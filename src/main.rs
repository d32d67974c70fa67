use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use subextract::{Cli, OutputFormatter, OutputMode, SubExtract, SubExtractError, UserFriendlyError};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let (Some(output_dir), Some(archive_dir)) = (cli.output_dir.clone(), cli.archive_dir.clone())
    else {
        // clap enforces the positionals unless --generate-config is given
        return 1;
    };

    let app = match SubExtract::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &app, &archive_dir, &output_dir);
    }

    match app.extract_submissions(&archive_dir, &output_dir, &cli.files) {
        Ok(report) => {
            app.output_formatter().print_batch_report(&report);

            if report.has_failures() {
                2 // Finished, but some files could not be extracted
            } else {
                0
            }
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &SubExtractError) -> i32 {
    match error {
        SubExtractError::Cancelled => 130, // Interrupted (SIGINT)
        SubExtractError::NoArchivesFound { .. } => 3,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("subextract.toml"));

    match SubExtract::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path.display());
            println!("\nTo use this configuration:");
            println!(
                "  subextract <output-dir> <archive-dir> <files>... --config {}",
                config_path.display()
            );
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, app: &SubExtract, archive_dir: &Path, output_dir: &Path) -> i32 {
    match app.dry_run(archive_dir, output_dir, &cli.files) {
        Ok(()) => 0,
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &SubExtractError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");

        let cli = Cli::try_parse_from([
            "subextract",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(handle_generate_config(&cli), 0);
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extract]"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&SubExtractError::Cancelled), 130);
        assert_eq!(
            exit_code_for(&SubExtractError::NoArchivesFound {
                directory: "d".to_string(),
                filter: "*.zip".to_string(),
            }),
            3
        );
        assert_eq!(
            exit_code_for(&SubExtractError::Config {
                message: "bad".to_string()
            }),
            1
        );
    }
}
