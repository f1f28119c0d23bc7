use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inkpad_core::{
    capitalize, cursor_position, format_text, lowercase, uppercase, Document, EditorSurface,
    MatchOption, SearchController, TextBuffer,
};
use inkpad_search::Occurrence;
use inkpad_settings::{PreferencesStore, RecentFilesStore};
use serde_json::json;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "inkpad-cli",
    about = "Text statistics, search and transform commands for InkPad",
    author,
    version
)]
struct Cli {
    /// Workspace root holding `.inkpad/preferences.json` (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print character, word, line and paragraph counts for a file.
    Stats(StatsArgs),
    /// Search (and optionally replace) across files.
    Search(SearchArgs),
    /// Apply a text transformer to a file and print the result.
    Transform(TransformArgs),
    /// Show, import or export preferences.
    #[command(subcommand)]
    Preferences(PreferencesCommand),
    /// List or clear recently opened files.
    #[command(subcommand)]
    Recent(RecentCommand),
}

#[derive(Args)]
struct StatsArgs {
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Emit the statistics as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Pattern to search for (literal or regex).
    pattern: String,

    /// Files or directories to search; defaults to current directory.
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Interpret pattern as regex.
    #[arg(long)]
    regex: bool,

    /// Case sensitive search, overriding the preference.
    #[arg(long, conflicts_with = "ignore_case")]
    case_sensitive: bool,

    /// Case insensitive search, overriding the preference.
    #[arg(long)]
    ignore_case: bool,

    /// Match whole words only (ignored with --regex).
    #[arg(long)]
    whole_word: bool,

    /// Replacement text to apply.
    #[arg(long, value_name = "TEXT")]
    replace: Option<String>,

    /// Persist replacements to disk (requires --replace).
    #[arg(long, requires = "replace")]
    apply: bool,
}

#[derive(Args)]
struct TransformArgs {
    #[arg(value_enum)]
    mode: TransformMode,

    #[arg(value_name = "FILE")]
    input: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TransformMode {
    Upper,
    Lower,
    Capitalize,
    Format,
}

#[derive(Subcommand)]
enum PreferencesCommand {
    /// Print the effective preferences as JSON.
    Show,
    /// Export current preferences.
    Export(PreferencesExportArgs),
    /// Import preferences from JSON.
    Import(PreferencesImportArgs),
}

#[derive(Subcommand)]
enum RecentCommand {
    /// Print recently opened files, newest first.
    List,
    /// Forget every recently opened file.
    Clear,
}

#[derive(Args)]
struct PreferencesExportArgs {
    /// Destination file path.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Args)]
struct PreferencesImportArgs {
    /// Source preferences JSON.
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<()> {
    let Cli { workspace, command } = Cli::parse();
    let workspace_root = resolve_workspace(workspace)?;
    match command {
        Commands::Stats(args) => execute_stats(args, &workspace_root),
        Commands::Search(args) => execute_search(args, &workspace_root),
        Commands::Transform(args) => execute_transform(args, &workspace_root),
        Commands::Preferences(subcommand) => {
            execute_preferences_command(subcommand, &workspace_root)
        }
        Commands::Recent(subcommand) => execute_recent_command(subcommand, &workspace_root),
    }
}

fn execute_stats(args: StatsArgs, workspace_root: &Path) -> Result<()> {
    let document = Document::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    record_recent(workspace_root, &args.input);
    let stats = document.statistics();
    if args.json {
        let payload = json!({
            "file": document.file_name(),
            "language": document.language().id(),
            "characters": stats.characters,
            "charactersNoSpaces": stats.characters_no_spaces,
            "words": stats.words,
            "lines": stats.lines,
            "paragraphs": stats.paragraphs,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("File: {} ({})", document.file_name(), document.language());
    println!("Characters: {}", stats.characters);
    println!("Characters (no spaces): {}", stats.characters_no_spaces);
    println!("Words: {}", stats.words);
    println!("Lines: {}", stats.lines);
    println!("Paragraphs: {}", stats.paragraphs);
    Ok(())
}

fn execute_transform(args: TransformArgs, workspace_root: &Path) -> Result<()> {
    let document = Document::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    record_recent(workspace_root, &args.input);
    let transformer: fn(&str) -> String = match args.mode {
        TransformMode::Upper => uppercase,
        TransformMode::Lower => lowercase,
        TransformMode::Capitalize => capitalize,
        TransformMode::Format => format_text,
    };
    println!("{}", transformer(document.contents()));
    Ok(())
}

struct FileHits {
    path: PathBuf,
    text: String,
    occurrences: Vec<Occurrence>,
    applied: Option<usize>,
}

fn execute_search(mut args: SearchArgs, workspace_root: &Path) -> Result<()> {
    let store = load_preferences(workspace_root)?;
    let mut controller = SearchController::new(&store);
    controller.set_search_term(args.pattern.as_str());
    controller.set_option(MatchOption::UseRegex, args.regex);
    controller.set_option(MatchOption::WholeWord, args.whole_word);
    if args.case_sensitive {
        controller.set_option(MatchOption::CaseSensitive, true);
    } else if args.ignore_case {
        controller.set_option(MatchOption::CaseSensitive, false);
    }
    if let Some(replacement) = args.replace.as_deref() {
        controller.set_replace_term(replacement);
    }

    if args.paths.is_empty() {
        let cwd = std::env::current_dir().context("failed to determine current directory")?;
        args.paths.push(cwd);
    }

    let targets = collect_target_files(&args.paths)?;
    if targets.is_empty() {
        println!("No files to search.");
        return Ok(());
    }

    let mut entries = Vec::new();
    for path in targets {
        match handle_file(&path, &controller, args.replace.is_some(), args.apply) {
            Ok(Some(hits)) => {
                if hits.applied.is_some() {
                    record_recent(workspace_root, &hits.path);
                }
                entries.push(hits);
            }
            Ok(None) => {}
            // An invalid pattern fails every file the same way; stop at the first.
            Err(err) if err.downcast_ref::<inkpad_search::SearchError>().is_some() => {
                return Err(err)
            }
            Err(err) => eprintln!("warning: {}: {err:#}", path.display()),
        }
    }

    if entries.is_empty() {
        println!("No matches found.");
        return Ok(());
    }

    print_search_report(&entries, &args.pattern);

    if args.replace.is_some() {
        if args.apply {
            for entry in &entries {
                if let Some(count) = entry.applied {
                    println!("Applied {} replacements to {}", count, entry.path.display());
                }
            }
        } else {
            println!("Dry run only; re-run with --apply to write changes.");
        }
    }

    Ok(())
}

fn collect_target_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        files.push(entry.path().to_path_buf());
                    }
                    Ok(_) => {}
                    Err(err) => eprintln!("warning: {}: {}", path.display(), err),
                }
            }
        } else {
            eprintln!("warning: {} does not exist", path.display());
        }
    }
    Ok(files)
}

fn handle_file(
    path: &Path,
    controller: &SearchController,
    replace: bool,
    apply: bool,
) -> Result<Option<FileHits>> {
    let mut document =
        Document::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let text = document.contents().to_string();
    let mut buffer = TextBuffer::new(text.as_str());

    let occurrences = controller.occurrences(Some(&buffer))?;
    if occurrences.is_empty() {
        return Ok(None);
    }
    debug!(path = %path.display(), hits = occurrences.len(), "matches found");

    let mut applied = None;
    if replace && apply {
        let count = controller.replace_all_in_document(Some(&mut buffer))?;
        document.set_contents(buffer.value());
        document
            .save()
            .with_context(|| format!("failed to write {}", path.display()))?;
        applied = Some(count);
    }

    Ok(Some(FileHits {
        path: path.to_path_buf(),
        text,
        occurrences,
        applied,
    }))
}

fn print_search_report(entries: &[FileHits], pattern: &str) {
    let total: usize = entries.iter().map(|entry| entry.occurrences.len()).sum();
    println!(
        "Search \"{}\" ({} hits in {} files)",
        pattern,
        total,
        entries.len()
    );
    for entry in entries {
        println!("  {} ({} hits)", entry.path.display(), entry.occurrences.len());
        for occurrence in &entry.occurrences {
            let position = cursor_position(&entry.text, occurrence.index);
            let line_text = entry
                .text
                .split('\n')
                .nth(position.line - 1)
                .unwrap_or_default();
            println!(
                "    Line {} (Col {}): {}",
                position.line, position.column, line_text
            );
        }
    }
}

fn execute_preferences_command(command: PreferencesCommand, workspace_root: &Path) -> Result<()> {
    match command {
        PreferencesCommand::Show => show_preferences(workspace_root),
        PreferencesCommand::Export(args) => export_preferences(args, workspace_root),
        PreferencesCommand::Import(args) => import_preferences(args, workspace_root),
    }
}

fn show_preferences(workspace_root: &Path) -> Result<()> {
    let store = load_preferences(workspace_root)?;
    println!("{}", serde_json::to_string_pretty(store.preferences())?);
    Ok(())
}

fn export_preferences(args: PreferencesExportArgs, workspace_root: &Path) -> Result<()> {
    let store = load_preferences(workspace_root)?;
    let output = resolve_input_path(&args.output)?;
    store
        .export_to(&output)
        .with_context(|| format!("failed to export preferences to {}", output.display()))?;
    println!("Exported preferences to {}", output.display());
    Ok(())
}

fn import_preferences(args: PreferencesImportArgs, workspace_root: &Path) -> Result<()> {
    let prefs_path = preferences_path(workspace_root);
    if let Some(parent) = prefs_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut store = load_preferences(workspace_root)?;
    let input = resolve_input_path(&args.input)?;
    if !input.exists() {
        bail!("preferences file '{}' does not exist", input.display());
    }
    store
        .import_from(&input)
        .with_context(|| format!("failed to import preferences from {}", input.display()))?;
    println!("Imported preferences from {}", input.display());
    Ok(())
}

fn execute_recent_command(command: RecentCommand, workspace_root: &Path) -> Result<()> {
    let recent_path = recent_files_path(workspace_root);
    let mut store = RecentFilesStore::load(&recent_path)
        .with_context(|| format!("failed to load recent files from {}", recent_path.display()))?;
    match command {
        RecentCommand::List => {
            if store.history().is_empty() {
                println!("No recent files.");
            }
            for entry in store.history().iter() {
                println!("{}  {}", entry.name, entry.path.display());
            }
        }
        RecentCommand::Clear => {
            store.clear()?;
            println!("Cleared recent files.");
        }
    }
    Ok(())
}

/// Failures here never abort the command that opened the file.
fn record_recent(workspace_root: &Path, path: &Path) {
    let recent_path = recent_files_path(workspace_root);
    let path = resolve_input_path(path).unwrap_or_else(|_| path.to_path_buf());
    let recorded = RecentFilesStore::load(&recent_path).and_then(|mut store| store.record(path));
    if let Err(err) = recorded {
        warn!(%err, "could not update recent files");
    }
}

fn recent_files_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".inkpad").join("recent.json")
}

fn load_preferences(workspace_root: &Path) -> Result<PreferencesStore> {
    let prefs_path = preferences_path(workspace_root);
    PreferencesStore::load(&prefs_path)
        .with_context(|| format!("failed to load preferences from {}", prefs_path.display()))
}

fn preferences_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".inkpad").join("preferences.json")
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
