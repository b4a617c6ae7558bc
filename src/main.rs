//! DOS2DE Importer - command line front end.
//!
//! The import pipeline itself needs a host scene editor; this binary exposes
//! the parts that work without one:
//!
//! - `skeletons`: list the base skeletons found in the extracted assets
//! - `textures <NAME>`: show the texture maps that would be used for an object
//! - `convert <FILES>...`: run the gr2 → dae conversion, conforming as configured
//!
//! # Configuration Files
//!
//! `Importer Preferences.yaml` in the config directory (`DOS2DE Data/` by
//! default), overridable with `DOS2DE_*` environment variables.

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use dos2de_importer::models::{ConformMode, Preferences};
use dos2de_importer::{
    APP_NAME, ConfigManager, ImportMetrics, Importer, SkeletonCatalog, StateManager,
    TextureResolver, VERSION,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dos2de-importer")]
#[command(about = "Divinity: Original Sin 2 Collada/Granny import tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding `Importer Preferences.yaml`
    #[arg(long, global = true, default_value = "DOS2DE Data")]
    config_dir: Utf8PathBuf,

    /// Directory for log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the base skeletons available for conforming
    Skeletons,

    /// Show the textures found for an object name
    Textures {
        /// Object file name, e.g. Humans_Female_Body_A
        name: String,
    },

    /// Convert Granny files to temporary Collada files
    Convert {
        /// .gr2 files to convert
        #[arg(required = true)]
        files: Vec<Utf8PathBuf>,

        /// disabled, auto, a skeleton key such as Humans_Male, or a skeleton path.
        /// Replaces the configured selection, manual fallback included
        #[arg(long)]
        conform: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging first so the preference loader's messages are kept
    let _log_guard =
        dos2de_importer::logging::setup_logging_with_console(&cli.log_dir, cli.debug, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let preferences = config_manager.load_preferences()?;
    if preferences.debug_mode && !cli.debug {
        tracing::info!(
            "debug_mode is set in the preferences; pass --debug or set DOS2DE_LOG for debug output"
        );
    }

    match cli.command {
        Commands::Skeletons => list_skeletons(&preferences),
        Commands::Textures { name } => show_textures(&preferences, &name),
        Commands::Convert { files, conform } => convert(&preferences, &files, conform.as_deref()),
    }
}

fn assets_root(preferences: &Preferences) -> Result<Utf8PathBuf> {
    preferences
        .assets_root()
        .context("extracted_assets_dir is not set in the preferences")
}

fn list_skeletons(preferences: &Preferences) -> Result<()> {
    let catalog = SkeletonCatalog::scan(&assets_root(preferences)?);

    for item in catalog.presentation_items() {
        println!("{:<16} {:<16} {}", item.key, item.label, item.description);
    }
    Ok(())
}

fn show_textures(preferences: &Preferences, name: &str) -> Result<()> {
    let textures = TextureResolver::new().resolve_textures(name, &assets_root(preferences)?);

    let roles = [
        ("basecolor", &textures.basecolor),
        ("normal", &textures.normalmap),
        ("physical", &textures.physicalmap),
        ("cloth mask", &textures.cloth_mask),
        ("skin mask", &textures.skin_mask),
    ];
    for (role, path) in roles {
        match path {
            Some(path) => println!("{role:<12} {path}"),
            None => println!("{role:<12} -"),
        }
    }
    Ok(())
}

fn convert(preferences: &Preferences, files: &[Utf8PathBuf], conform: Option<&str>) -> Result<()> {
    // Single-threaded: files are converted one after another
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let catalog = preferences
        .assets_root()
        .map(|root| SkeletonCatalog::scan(&root))
        .unwrap_or_default();
    let metrics = Arc::new(ImportMetrics::new());
    let importer =
        Importer::from_preferences(&catalog, preferences).with_metrics(Arc::clone(&metrics));

    let state_manager = StateManager::new();
    state_manager.load_from_preferences(preferences);

    let mut options = state_manager.settings().snapshot();
    if let Some(conform) = conform {
        options = options.with_conform(conform.parse::<ConformMode>()?);
    }

    let failures = runtime.block_on(async {
        let mut failures = 0;
        for file in files {
            match importer.prepare(file, &options).await {
                Ok(prepared) => println!("{} -> {}", file, prepared.collada_path),
                Err(e) => {
                    tracing::error!("Failed to convert {}: {}", file, e);
                    eprintln!("{file}: {e}");
                    failures += 1;
                }
            }
        }
        failures
    });

    metrics.log_summary();

    if failures > 0 {
        bail!("{failures} of {} file(s) failed to convert", files.len());
    }
    Ok(())
}
