//! Linux Term Headless Runner
//!
//! Runs recorded shell output through a full session (reader and flusher
//! threads included) and prints what a screen reader would receive.
//! Announcements and bells go to stderr, the final snapshot to stdout.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use linux_term::app::{init_logging, Config};
use linux_term::core::{LineBuffer, Snapshot};
use linux_term::speech::Announcement;
use linux_term::{BatchUpdate, Session, SessionListener};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut terminfo_file: Option<PathBuf> = None;
    let mut input_file: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut output_format = OutputFormat::Text;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-t" | "--terminfo" => {
                i += 1;
                terminfo_file = args.get(i).map(PathBuf::from);
            }
            "-i" | "--input" => {
                i += 1;
                input_file = args.get(i).map(PathBuf::from);
            }
            "-c" | "--config" => {
                i += 1;
                config_file = args.get(i).map(PathBuf::from);
            }
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            }
            "-h" | "--help" => {
                show_help = true;
            }
            other => {
                // Treat as input file if no flag
                if input_file.is_none() && !other.starts_with('-') {
                    input_file = Some(PathBuf::from(other));
                } else {
                    eprintln!("Unknown argument '{}'", other);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match &config_file {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
        None => Config::load_or_default(),
    };
    init_logging(&config.log_filter);

    let Some(terminfo_file) = terminfo_file else {
        eprintln!("Missing --terminfo <FILE>");
        print_help();
        return ExitCode::FAILURE;
    };
    let dump = match std::fs::read_to_string(&terminfo_file) {
        Ok(dump) => dump,
        Err(e) => {
            eprintln!("Error reading '{}': {}", terminfo_file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let started = match &input_file {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => Session::start(&config, &dump, file, StderrListener),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
        None => Session::start(&config, &dump, io::stdin(), StderrListener),
    };

    let terminal = match started.and_then(Session::wait) {
        Ok((terminal, _)) => terminal,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Output result
    let snapshot = terminal.snapshot();
    match output_format {
        OutputFormat::Text => print_text(&snapshot),
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Prints speech events as they happen
struct StderrListener;

impl SessionListener for StderrListener {
    fn on_batch_ready(&mut self, _buffer: &LineBuffer, update: &BatchUpdate) {
        tracing::debug!(
            "Batch: {} lines, cursor ({}, {})",
            update.line_count,
            update.cursor.row,
            update.cursor.col
        );
    }

    fn on_bell(&mut self) {
        eprintln!("[bell]");
    }

    fn on_announcement(&mut self, announcement: &Announcement) {
        match announcement {
            Announcement::Letter(c) => eprintln!("[letter] {}", c),
            Announcement::Text(text) => eprintln!("[say] {}", text),
        }
    }
}

fn print_text(snapshot: &Snapshot) {
    println!("Lines: {}", snapshot.lines.len());
    println!("Cursor: ({}, {})", snapshot.cursor_row, snapshot.cursor_col);
    println!("---");
    print!("{}", snapshot.to_text());
    println!("---");
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("Linux Term Headless Runner");
    println!();
    println!("Usage: linux-term-headless --terminfo <FILE> [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -t, --terminfo <PATH>  infocmp output for the terminal type (required)");
    println!("  -i, --input <PATH>     Read shell output from file");
    println!("  -c, --config <PATH>    Configuration file (JSON)");
    println!("  -j, --json             Output snapshot as JSON");
    println!("  -h, --help             Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!();
    println!("Examples:");
    println!("  infocmp linux > linux.ti");
    println!("  printf 'ls\\r\\n\\x1b[1;34mdir\\x1b[0m\\r\\n' | linux-term-headless -t linux.ti");
    println!("  script -q -c bash session.log; linux-term-headless -t linux.ti --json session.log");
}
