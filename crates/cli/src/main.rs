use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use phototime_core::{
    app_paths, find_candidates, list_candidates, load_config, move_candidates,
    rename_candidates, save_config, AppConfig, ConflictPolicy, DiscoveryOptions,
    ExtensionClassifier, ExtractionPolicy, RunOptions, TimeRange, TraversalMode,
};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "phototime", version)]
#[command(about = "Lists, renames and moves photos by the time they were taken")]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List image files that this tool can target
    #[command(visible_alias = "q")]
    Query(SelectionArgs),
    /// Rename image files to their photo-taken timestamp
    #[command(visible_alias = "r")]
    Rename(RenameArgs),
    /// Move image files into a target directory
    #[command(visible_alias = "m")]
    Move(MoveArgs),
    /// Show or initialize the config file
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the config file location and the effective settings
    Show,
    /// Write a config file with the default settings if none exists
    Init,
}

#[derive(Debug, Args)]
struct SelectionArgs {
    /// Files taken at or after this local time (YYYY-MM-DDThh:mm:ss)
    #[arg(long)]
    from: Option<String>,
    /// Files taken at or before this local time (YYYY-MM-DDThh:mm:ss)
    #[arg(long)]
    to: Option<String>,
    #[arg(long, value_enum)]
    traversal: Option<TraversalArg>,
    /// Warn about files whose metadata cannot be read instead of stopping
    #[arg(long, default_value_t = false)]
    skip_unreadable: bool,
    /// Files, directories or glob patterns (default: working directory)
    paths: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ApplyArgs {
    /// Log operations that would take place, without performing them
    #[arg(short, long, default_value_t = false)]
    dry_run: bool,
    #[arg(long, value_enum)]
    on_conflict: Option<ConflictArg>,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[command(flatten)]
    apply: ApplyArgs,
    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Debug, Args)]
struct MoveArgs {
    #[command(flatten)]
    apply: ApplyArgs,
    /// Target folder, absolute or relative to the working directory
    #[arg(long, default_value = ".")]
    target: PathBuf,
    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TraversalArg {
    /// Recurse into directories
    Walk,
    /// Expand each path as a glob pattern, without recursion
    Glob,
}

impl From<TraversalArg> for TraversalMode {
    fn from(value: TraversalArg) -> Self {
        match value {
            TraversalArg::Walk => TraversalMode::Walk,
            TraversalArg::Glob => TraversalMode::Glob,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConflictArg {
    /// Append _001, _002, ... to the new name
    Suffix,
    /// Stop the run
    Fail,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(value: ConflictArg) -> Self {
        match value {
            ConflictArg::Suffix => ConflictPolicy::Suffix,
            ConflictArg::Fail => ConflictPolicy::Fail,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Query(args) => cmd_query(args),
        Commands::Rename(args) => cmd_rename(args),
        Commands::Move(args) => cmd_move(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init => cmd_config_init(),
        },
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn discovery_options(args: SelectionArgs, config: &AppConfig) -> Result<DiscoveryOptions> {
    let range = TimeRange::parse(args.from.as_deref(), args.to.as_deref())?;
    let on_extract_error = if args.skip_unreadable || config.skip_unreadable {
        ExtractionPolicy::SkipWithWarning
    } else {
        ExtractionPolicy::Strict
    };

    Ok(DiscoveryOptions {
        roots: args.paths,
        traversal: args.traversal.map(Into::into).unwrap_or(config.traversal),
        range,
        on_extract_error,
        classifier: ExtensionClassifier::new(&config.extensions),
    })
}

fn run_options(args: &ApplyArgs, config: &AppConfig) -> RunOptions {
    RunOptions {
        dry_run: args.dry_run,
        on_conflict: args.on_conflict.map(Into::into).unwrap_or(config.on_conflict),
    }
}

fn cmd_query(args: SelectionArgs) -> Result<()> {
    let config = load_config()?;
    let candidates = find_candidates(&discovery_options(args, &config)?)?;

    let mut out = io::stdout().lock();
    list_candidates(&candidates, &mut out)?;
    out.flush()?;
    info!("{} matching files", candidates.len());
    Ok(())
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;
    let options = run_options(&args.apply, &config);
    let candidates = find_candidates(&discovery_options(args.selection, &config)?)?;

    let mut out = io::stdout().lock();
    let summary = rename_candidates(&candidates, &options, &mut out)?;
    out.flush()?;
    info!(
        "renamed {} files, skipped {}{}",
        summary.applied,
        summary.skipped,
        dry_run_note(options.dry_run)
    );
    Ok(())
}

fn cmd_move(args: MoveArgs) -> Result<()> {
    let config = load_config()?;
    let options = run_options(&args.apply, &config);
    let candidates = find_candidates(&discovery_options(args.selection, &config)?)?;

    let mut out = io::stdout().lock();
    let summary = move_candidates(&candidates, &args.target, &options, &mut out)?;
    out.flush()?;
    info!(
        "moved {} files into {}, skipped {}{}",
        summary.applied,
        args.target.display(),
        summary.skipped,
        dry_run_note(options.dry_run)
    );
    Ok(())
}

fn dry_run_note(dry_run: bool) -> &'static str {
    if dry_run {
        " (dry run, nothing was changed)"
    } else {
        ""
    }
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let paths = app_paths()?;
    if paths.config_path.exists() {
        println!("config file already exists: {}", paths.config_path.display());
        return Ok(());
    }
    let written = save_config(&AppConfig::default())?;
    println!("wrote {}", written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{discovery_options, run_options, Cli, Commands};
    use clap::{CommandFactory, Parser};
    use phototime_core::{AppConfig, ConflictPolicy, ExtractionPolicy, TraversalMode};
    use std::path::PathBuf;

    #[test]
    fn move_flags_parse_with_paths() {
        let cli = Cli::try_parse_from([
            "phototime",
            "-vv",
            "move",
            "--dry-run",
            "--from",
            "2023-01-01T00:00:00",
            "--target",
            "sorted",
            "--on-conflict",
            "fail",
            "a.jpg",
            "b.jpg",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);

        let Commands::Move(args) = cli.command else {
            panic!("expected move");
        };
        assert!(args.apply.dry_run);
        assert_eq!(args.target, PathBuf::from("sorted"));
        assert_eq!(
            run_options(&args.apply, &AppConfig::default()).on_conflict,
            ConflictPolicy::Fail
        );
        assert_eq!(
            args.selection.paths,
            vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]
        );
    }

    #[test]
    fn every_subcommand_has_a_help_line() {
        let command = Cli::command();
        for sub in command.get_subcommands() {
            let about = sub.get_about().map(|about| about.to_string());
            assert!(
                about.is_some_and(|about| !about.is_empty()),
                "{} has no help line",
                sub.get_name()
            );
        }
        let config = command.find_subcommand("config").expect("config subcommand");
        assert_eq!(
            config.get_about().map(|about| about.to_string()).as_deref(),
            Some("Show or initialize the config file")
        );
    }

    #[test]
    fn query_uses_short_alias_and_rejects_dry_run() {
        assert!(Cli::try_parse_from(["phototime", "q", "photos"]).is_ok());
        assert!(Cli::try_parse_from(["phototime", "query", "--dry-run"]).is_err());
    }

    #[test]
    fn flags_override_config_defaults() {
        let config = AppConfig {
            traversal: TraversalMode::Glob,
            ..AppConfig::default()
        };

        let cli = Cli::try_parse_from(["phototime", "r", "--skip-unreadable", "--traversal", "walk"])
            .expect("parse");
        let Commands::Rename(args) = cli.command else {
            panic!("expected rename");
        };
        let options = discovery_options(args.selection, &config).expect("options");
        assert_eq!(options.traversal, TraversalMode::Walk);
        assert_eq!(options.on_extract_error, ExtractionPolicy::SkipWithWarning);

        let cli = Cli::try_parse_from(["phototime", "r"]).expect("parse");
        let Commands::Rename(args) = cli.command else {
            panic!("expected rename");
        };
        let options = discovery_options(args.selection, &config).expect("options");
        assert_eq!(options.traversal, TraversalMode::Glob);
        assert_eq!(options.on_extract_error, ExtractionPolicy::Strict);
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let cli = Cli::try_parse_from(["phototime", "query", "--from", "2023-01-01"])
            .expect("parse");
        let Commands::Query(args) = cli.command else {
            panic!("expected query");
        };
        let err = discovery_options(args, &AppConfig::default()).expect_err("bad timestamp");
        assert!(err.to_string().contains("invalid timestamp"));
    }
}
