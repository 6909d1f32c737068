use artwork_tools::catalog::{annotate, artwork, ratios, titles, validator};
use artwork_tools::config::{Config, Environment, Overrides};
use artwork_tools::state::{Library, MergeStats};
use artwork_tools::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "artwork-tools")]
#[command(about = "Validate, annotate and import the artwork catalog")]
struct Cli {
    /// Root folder holding one subfolder per artwork
    #[arg(long, global = true)]
    images_dir: Option<PathBuf>,
    /// Which `.env.<env>` file to load
    #[arg(long, global = true, value_enum, default_value_t = Environment::Dev)]
    env: Environment,
    /// SQLite catalog file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check every artwork folder for its description, title and images
    Validate {
        /// Print the report as JSON on stdout
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Import valid artwork folders into the catalog
    Merge {
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Create missing -med/-sm variants from the large image
        #[arg(long, default_value_t = false)]
        generate_thumbnails: bool,
    },
    /// Write the "Valid Ratios" section into each description file
    Ratios {
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Fill empty titles from the folder name
    FixTitles {
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// List the print sizes matching a width and height
    Ratio { width: f64, height: f64 },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let overrides = Overrides {
        images_dir: cli.images_dir,
        db_path: cli.db,
    };
    let env = cli.env;
    let load_config = || -> Result<Config> {
        let config = Config::load(env, Path::new("."), overrides.clone())?;
        info!("Environment: {}", config.environment);
        info!("Images directory: {}", config.images_dir.display());
        Ok(config)
    };

    match cli.command {
        Command::Validate { json } => run_validate(&load_config()?, json),
        Command::Merge {
            dry_run,
            generate_thumbnails,
        } => run_merge(&load_config()?, dry_run, generate_thumbnails),
        Command::Ratios { dry_run } => run_ratios(&load_config()?, dry_run),
        Command::FixTitles { dry_run } => run_fix_titles(&load_config()?, dry_run),
        Command::Ratio { width, height } => run_ratio(width, height),
    }
}

fn run_ratio(width: f64, height: f64) -> Result<ExitCode> {
    let matched = ratios::match_ratio(width, height)?;
    println!("Ratio: {}:{}", matched.simplified.0, matched.simplified.1);
    if matched.is_empty() {
        println!("No matching print sizes");
    } else {
        println!("Print sizes: {}", matched.labels().join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(config: &Config, json: bool) -> Result<ExitCode> {
    let report = validator::validate_root(&config.images_dir)?;
    report.log_summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    }

    Ok(if report.invalid().next().is_none() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_merge(config: &Config, dry_run: bool, generate_thumbnails: bool) -> Result<ExitCode> {
    info!("🚀 Starting artwork merge");
    if dry_run {
        info!("🔍 DRY RUN mode - no changes will be made to the database");
    }

    let report = validator::validate_root(&config.images_dir)?;
    for dir in report.invalid() {
        warn!("Skipping invalid folder {}: {:?}", dir.name, dir.missing());
    }

    let mut records = Vec::new();
    let mut errors = 0;
    for dir in report.valid() {
        info!("📂 Processing: {}", dir.name);
        match artwork::process_artwork_directory(
            &dir.path,
            &config.featured_titles,
            generate_thumbnails,
        ) {
            Ok(record) => records.push(record),
            Err(e) => {
                error!("  ❌ {}: {}", dir.name, e);
                errors += 1;
            }
        }
    }
    info!("Found {} artworks to merge", records.len());

    let mut library = if dry_run {
        Library::open_in_memory()?
    } else {
        Library::open(&config.db_path)?
    };

    let stats = MergeStats {
        errors,
        ..library.merge_all(&records, dry_run)?
    };
    log_merge_stats(&stats);

    if !dry_run {
        info!("📚 {} artworks in catalog", library.artwork_count()?);
    }

    Ok(if stats.errors == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn log_merge_stats(stats: &MergeStats) {
    info!("📊 Merge statistics:");
    info!("  ✨ Inserted: {}", stats.inserted);
    info!("  🔄 Updated:  {}", stats.updated);
    info!("  ⏭️  Skipped:  {}", stats.skipped);
    info!("  ❌ Errors:   {}", stats.errors);
    info!("  📈 Total:    {}", stats.total());
}

fn run_ratios(config: &Config, dry_run: bool) -> Result<ExitCode> {
    let dirs = annotate::annotatable_directories(&config.images_dir)?;
    info!("Found {} artwork folders", dirs.len());

    let mut updated = 0;
    let mut failed = 0;
    for dir in &dirs {
        match annotate::annotate_directory(dir, dry_run) {
            Ok(Some(outcome)) if outcome.changed => updated += 1,
            Ok(_) => {}
            Err(e) => {
                error!("  ❌ {}", e);
                failed += 1;
            }
        }
    }

    if dry_run {
        info!("[DRY RUN] {} description files would change", updated);
    } else {
        info!("✓ Updated {} description files", updated);
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_fix_titles(config: &Config, dry_run: bool) -> Result<ExitCode> {
    let fixed = titles::fix_missing_titles(&config.images_dir, dry_run)?;
    if dry_run {
        info!("[DRY RUN] {} titles would be filled in", fixed.len());
    } else {
        info!("✓ Filled in {} titles", fixed.len());
    }
    Ok(ExitCode::SUCCESS)
}
