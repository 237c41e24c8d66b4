use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use scene_dataset_curator::config::AppConfig;
use scene_dataset_curator::core::{analysis, manifest, operations, split};
use scene_dataset_curator::error::CurateResult;
use scene_dataset_curator::logging;

#[derive(Parser)]
#[command(
    name = "scene-dataset-curator",
    version,
    about = "Curate Clean/Clutter scene captures into manifests, merged pools and train/test splits"
)]
struct Cli {
    /// JSON config file; defaults to the platform config dir when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to a timestamped file in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the scene manifest (meta.json) from the Clean/Clutter folders
    Manifest {
        scene_dir: PathBuf,

        /// Output path. Default: <scene_dir>/meta.json
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Link Clean and Clutter images into the prefixed <scene>-All/images pool
    Merge {
        base_dir: PathBuf,

        #[arg(long)]
        clean_prefix: Option<String>,

        #[arg(long)]
        clutter_prefix: Option<String>,

        /// Copy files instead of hard linking them.
        #[arg(long, default_value_t = false)]
        copy: bool,
    },

    /// Write split.json from the scene's reconstruction model image list
    Split {
        scene_dir: PathBuf,

        #[arg(long)]
        train_keyword: Option<String>,

        #[arg(long)]
        test_keyword: Option<String>,

        /// Model directory relative to the scene. Default: undistortion_sparse/0
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },

    /// Check split.json entries against the train/test keywords
    CheckSplit {
        scene_dir: PathBuf,

        #[arg(long)]
        train_keyword: Option<String>,

        #[arg(long)]
        test_keyword: Option<String>,
    },

    /// Count frames of transforms*.json in every *-All folder and write a CSV
    FrameCounts {
        base_dir: PathBuf,

        /// Output CSV. Default: <base_dir>/frame_counts_by_scene.csv
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn apply_keywords(config: &mut AppConfig, train: Option<String>, test: Option<String>) {
    if let Some(train) = train {
        config.split.keywords.train = train;
    }
    if let Some(test) = test {
        config.split.keywords.test = test;
    }
}

fn run(cmd: Commands, mut config: AppConfig) -> CurateResult<()> {
    match cmd {
        Commands::Manifest { scene_dir, output } => {
            let build = manifest::generate_manifest(&scene_dir, output.as_deref(), &config)?;
            for (folder, outcome) in &build.outcomes {
                info!("{}: {:?}", folder, outcome);
            }
            info!(
                "Scene {} at {}: {} images",
                build.manifest.scene_id, build.manifest.resolution, build.manifest.total_images
            );
        }
        Commands::Merge {
            base_dir,
            clean_prefix,
            clutter_prefix,
            copy,
        } => {
            if let Some(prefix) = clean_prefix {
                config.merge.clean_prefix = prefix;
            }
            if let Some(prefix) = clutter_prefix {
                config.merge.clutter_prefix = prefix;
            }
            if copy {
                config.merge.link_mode = operations::LinkMode::Copy;
            }
            let (_, summary) = operations::merge_scene(&base_dir, &config)?;
            if !summary.failures.is_empty() {
                warn!("{} files could not be linked", summary.failures.len());
            }
        }
        Commands::Split {
            scene_dir,
            train_keyword,
            test_keyword,
            model_dir,
        } => {
            apply_keywords(&mut config, train_keyword, test_keyword);
            if let Some(model_dir) = model_dir {
                config.split.model_subdir = model_dir;
            }
            split::build_scene_split(&scene_dir, &config.split)?;
        }
        Commands::CheckSplit {
            scene_dir,
            train_keyword,
            test_keyword,
        } => {
            apply_keywords(&mut config, train_keyword, test_keyword);
            split::check_scene_split(&scene_dir, &config.split)?;
        }
        Commands::FrameCounts { base_dir, output } => {
            analysis::aggregate_frame_counts(
                &base_dir,
                output.as_deref(),
                &config.dataset,
                &config.frame_counts,
            )?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.log_dir.as_deref()) {
        eprintln!("Failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.cmd, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
