//! mailsift-cli entry point.
//!
//! Offline tooling around the runtime: chunk plans, label files and
//! configuration. Serving is left to the host application, which embeds
//! [`mailsift_core::EmailPipeline`] with its own model backends.
//!
//! ## CLI Subcommands
//!
//! - `mailsift-cli plan <file|->` - Show the chunk plan for a document
//! - `mailsift-cli labels <path>` - Validate a label file
//! - `mailsift-cli config show|defaults|validate` - Inspect configuration

use std::path::PathBuf;
use std::process::ExitCode;

use mailsift_core::cli;
use mailsift_core::config;
use mailsift_core::telemetry::init_logging;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    if let Err(e) = init_logging(&config::load().log_config()) {
        eprintln!("Logging disabled: {}", e);
    }

    match command {
        "plan" => {
            let Some(source) = args.get(2) else {
                eprintln!("Usage: mailsift-cli plan <file|-> [--json]");
                return ExitCode::FAILURE;
            };
            let json = args.iter().skip(3).any(|a| a == "--json");
            exit(cli::run_plan(source, json))
        }
        "labels" => {
            let path = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| config::load().labels_path);
            exit(cli::run_labels(&path))
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let json = args.get(3).map(|s| s.as_str()) == Some("--json");
                    exit(cli::run_show(json))
                }
                "defaults" => {
                    cli::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => exit(cli::run_validate()),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("mailsift-cli {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "mailsift-cli - email classification and summarization runtime v{}

USAGE:
    mailsift-cli [COMMAND] [OPTIONS]

COMMANDS:
    plan         Show how a document is chunked for summarization
    labels       Validate a label file and list its categories
    config       Inspect configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

EXAMPLES:
    mailsift-cli plan email.txt
    cat email.txt | mailsift-cli plan - --json
    mailsift-cli labels label_classes.json
    mailsift-cli config validate

ENVIRONMENT:
    MAILSIFT_DEVICE            auto | cpu (default: auto)
    MAILSIFT_LABELS_PATH       Label file (default: label_classes.json)
    MAILSIFT_CLASSIFIER_MODEL  Classifier model id
    MAILSIFT_SUMMARIZER_MODEL  Summarizer model id
    MAILSIFT_LOG_LEVEL         Tracing filter (default: info)
    MAILSIFT_LOG_FORMAT        json | pretty (default: json)

EXIT CODES:
    0  Success
    1  Failure or invalid input
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "plan" => {
            eprintln!(
                "mailsift-cli plan - Show the chunk plan

USAGE:
    mailsift-cli plan <FILE|-> [--json]

DESCRIPTION:
    Splits the document into word-count chunks exactly as the summarizer
    would and prints each chunk's first word, size and generation length
    bounds. No model is loaded. Use '-' to read from stdin.
"
            );
        }
        "labels" => {
            eprintln!(
                "mailsift-cli labels - Validate a label file

USAGE:
    mailsift-cli labels [PATH]

DESCRIPTION:
    Loads a JSON array of category names and lists them in classifier
    output order. Defaults to MAILSIFT_LABELS_PATH.
"
            );
        }
        "config" => {
            eprintln!(
                "mailsift-cli config - Inspect configuration

USAGE:
    mailsift-cli config <SUBCOMMAND>

SUBCOMMANDS:
    show [--json]  Show effective configuration
    defaults       Show default configuration
    validate       Check env values and the label file
"
            );
        }
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'mailsift-cli help' for general usage.",
                command
            );
        }
    }
}
