//! ardulane CLI
//!
//! Entry point for the `ardulane` command-line tool.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use ardulane::{
    BuildOverrides, Catalog, Preferences, SessionError, ShellRunner, UploadRequest, UploadSession,
};

#[derive(Parser)]
#[command(name = "ardulane")]
#[command(about = "Board upload lane: resolve catalog config and flash boards", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Identifier flags shared by session-building commands. Values omitted
/// here fall back to the preferences file.
#[derive(Args)]
struct SessionArgs {
    /// Catalog file (boards.txt format); repeatable, later files win
    #[arg(long, short = 'c', required = true)]
    catalog: Vec<PathBuf>,

    /// Board identifier
    #[arg(long, short = 'b')]
    board: Option<String>,

    /// Cpu identifier (required iff the board has a cpu menu)
    #[arg(long)]
    cpu: Option<String>,

    /// Programmer identifier
    #[arg(long, short = 'P')]
    programmer: Option<String>,

    /// Serial/connection port
    #[arg(long, short = 'p')]
    port: Option<String>,

    /// Path to preferences file (default: ~/.config/ardulane/prefs.toml)
    #[arg(long)]
    prefs: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the session and run the upload command
    Upload {
        #[command(flatten)]
        session: SessionArgs,

        /// Directory holding the built firmware
        #[arg(long)]
        build_path: Option<String>,

        /// Firmware file base name
        #[arg(long)]
        project_name: Option<String>,

        /// Print the expanded command without executing it
        #[arg(long)]
        dry_run: bool,

        /// Output the upload summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the session and expand an arbitrary template key
    Expand {
        #[command(flatten)]
        session: SessionArgs,

        /// Template key to expand (e.g. upload.pattern)
        key: String,
    },

    /// List boards (and their cpu choices) defined in the catalog
    Boards {
        /// Catalog file (boards.txt format); repeatable, later files win
        #[arg(long, short = 'c', required = true)]
        catalog: Vec<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            session,
            build_path,
            project_name,
            dry_run,
            json,
        } => run_upload(session, build_path, project_name, dry_run, json),
        Commands::Expand { session, key } => run_expand(session, &key),
        Commands::Boards { catalog, json } => run_boards(catalog, json),
    }
}

fn run_upload(
    args: SessionArgs,
    build_path: Option<String>,
    project_name: Option<String>,
    dry_run: bool,
    json: bool,
) {
    let catalog = load_catalog(&args.catalog);
    let request = build_request(&args);
    let session = resolve(&catalog, request);

    let build = match (build_path, project_name) {
        (Some(path), Some(project_name)) => Some(BuildOverrides { path, project_name }),
        (None, None) => None,
        _ => {
            eprintln!("Error: --build-path and --project-name must be given together");
            process::exit(2);
        }
    };

    let command = match session.upload_command(build.as_ref()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json {
        match session.summary(&command).to_json() {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing summary: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", command);
    }

    if dry_run {
        return;
    }

    match session.upload(&ShellRunner, build.as_ref()) {
        Ok(()) => {}
        Err(SessionError::ExternalProcessFailure { exit_code }) => {
            eprintln!("Upload failed with exit status {}", exit_code);
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_expand(args: SessionArgs, key: &str) {
    let catalog = load_catalog(&args.catalog);
    let request = build_request(&args);
    let session = resolve(&catalog, request);

    match session.expand(key) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_boards(paths: Vec<PathBuf>, json: bool) {
    let catalog = load_catalog(&paths);

    if json {
        let output: Vec<serde_json::Value> = catalog
            .board_ids()
            .into_iter()
            .map(|board| {
                let cpus: Vec<String> =
                    catalog.board_supported_cpus(&board).into_iter().collect();
                serde_json::json!({ "board": board, "cpus": cpus })
            })
            .collect();
        match serde_json::to_string_pretty(&output) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    for board in catalog.board_ids() {
        let cpus = catalog.board_supported_cpus(&board);
        if cpus.is_empty() {
            println!("{}", board);
        } else {
            let cpus: Vec<String> = cpus.into_iter().collect();
            println!("{} ({})", board, cpus.join(", "));
        }
    }
}

fn load_catalog(paths: &[PathBuf]) -> Catalog {
    match Catalog::load_files(paths) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            process::exit(2);
        }
    }
}

/// Fill identifiers from CLI flags, falling back to the preferences file.
fn build_request(args: &SessionArgs) -> UploadRequest {
    let prefs = load_prefs(args.prefs.clone());

    let board = match args.board.clone().or(prefs.board) {
        Some(board) => board,
        None => {
            eprintln!("Error: no board selected (use --board or set it in preferences)");
            process::exit(2);
        }
    };
    let programmer = match args.programmer.clone().or(prefs.programmer) {
        Some(programmer) => programmer,
        None => {
            eprintln!("Error: no programmer selected (use --programmer or set it in preferences)");
            process::exit(2);
        }
    };

    UploadRequest {
        board,
        cpu: args.cpu.clone().or(prefs.cpu),
        programmer,
        port: args.port.clone().or(prefs.port),
    }
}

fn load_prefs(path: Option<PathBuf>) -> Preferences {
    let path = match path.or_else(Preferences::default_path) {
        Some(path) => path,
        None => return Preferences::default(),
    };
    match Preferences::load(&path) {
        Ok(prefs) => prefs,
        Err(e) => {
            eprintln!("Error loading preferences: {}", e);
            process::exit(2);
        }
    }
}

fn resolve<'a>(catalog: &'a Catalog, request: UploadRequest) -> UploadSession<'a> {
    match UploadSession::resolve(catalog, request) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
