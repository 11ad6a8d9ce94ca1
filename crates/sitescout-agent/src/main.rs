//! SiteScout: data-center site ranking.
//! Entry point for the `sitescout` binary.

mod config;
mod demo;
mod markers;
mod pipeline;
mod report;
mod session;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sitescout_common::{ExportFormat, RankingStrategy};
use sitescout_geo::sampler::sample_or_absent;
use sitescout_ranker::scorer::score_site_with;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Overrides;
use crate::session::ScoutSession;

#[derive(Parser, Debug)]
#[command(name = "sitescout", version, about = "Rank candidate data-center sites")]
struct Cli {
    /// Config file (otherwise SITESCOUT_CONFIG, then ./sitescout.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a GeoJSON boundary file and rank every site in it
    Rank {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        opts: RankOpts,
    },
    /// Rank the built-in demo batch
    Demo {
        #[command(flatten)]
        opts: RankOpts,
    },
    /// Score one named site from a boundary file with the deterministic formula
    Site {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Args, Debug)]
struct RankOpts {
    /// deterministic | narrative | mock
    #[arg(long)]
    strategy: Option<RankingStrategy>,

    /// Write the ranking to this file
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// csv | json
    #[arg(long)]
    format: Option<ExportFormat>,
}

impl From<RankOpts> for Overrides {
    fn from(opts: RankOpts) -> Self {
        Self { strategy: opts.strategy, export_path: opts.export, format: opts.format }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sitescout=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    info!("SiteScout {}", env!("CARGO_PKG_VERSION"));

    let base = config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Rank { file, opts } => {
            let config = config::apply_overrides(base, &opts.into());
            let batch = pipeline::load_file(&file)?;
            let sampler = pipeline::build_sampler(&config.sampler);
            let session = pipeline::load_session(ScoutSession::new(), &batch, sampler.as_ref());
            run_ranking(session, &config).await
        }
        Command::Demo { opts } => {
            let config = config::apply_overrides(base, &opts.into());
            let session = pipeline::load_session(ScoutSession::new(), &demo::demo_batch(), &demo::demo_sampler());
            run_ranking(session, &config).await
        }
        Command::Site { file, name } => {
            let batch = pipeline::load_file(&file)?;
            let feature = batch
                .features
                .iter()
                .find(|f| f.name == name)
                .ok_or_else(|| anyhow::anyhow!("No site named {name:?} in {}", file.display()))?;

            let sampler = pipeline::build_sampler(&base.sampler);
            let mut site = feature.to_site();
            sample_or_absent(sampler.as_ref(), feature).apply_to(&mut site);

            let ranked = score_site_with(&site, &pipeline::scoring_weights(&base));
            print!("{}", report::render_ranking(std::slice::from_ref(&ranked)));
            Ok(())
        }
    }
}

async fn run_ranking(session: ScoutSession, config: &sitescout_common::ScoutConfig) -> anyhow::Result<()> {
    let api_key = config::resolve_api_key(&config.llm);
    let ranker = pipeline::build_ranker(config, api_key);
    let session = pipeline::rank_session(session, ranker.as_ref()).await;

    println!("{}", report::render_view(&session.map_view()));
    println!();
    print!("{}", report::render_ranking(&session.ranked));
    println!();
    print!("{}", report::render_markers(&markers::build_markers(&session)));

    pipeline::export_session(&session, config)
}
