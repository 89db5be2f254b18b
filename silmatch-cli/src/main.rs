use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use silmatch::io::{decode_data_url, load_image};
use silmatch::{
    CanonConfig, Canonicalizer, Corpus, DirStore, RankConfig, SilMatchError, SimilarityRanker,
    SsimConfig,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Silhouette canonicalization and similarity ranking")]
struct Cli {
    /// Path to an optional JSON configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long, global = true)]
    trace: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Canonicalize every PNG in a directory in place; shapes that come out
    /// empty are deleted and files that fail to decode are skipped.
    Canonicalize {
        /// Directory of rendered shape images.
        dir: PathBuf,
    },
    /// Rank a query image against a directory of canonical silhouettes.
    Rank {
        /// Query image file.
        #[arg(long, conflicts_with = "data_url", required_unless_present = "data_url")]
        query: Option<PathBuf>,
        /// File holding a base64 image payload (optionally a `data:` URL).
        #[arg(long)]
        data_url: Option<PathBuf>,
        /// Directory of canonical silhouettes.
        #[arg(long)]
        corpus: PathBuf,
        /// Keep only the best N results.
        #[arg(long)]
        limit: Option<usize>,
        /// Write the JSON ranking here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CanonConfigJson {
    threshold: u8,
    inner_width: usize,
    inner_height: usize,
    canvas_width: usize,
    canvas_height: usize,
    foreground: u8,
    background: u8,
    settle: bool,
    parallel: bool,
}

impl Default for CanonConfigJson {
    fn default() -> Self {
        let cfg = CanonConfig::default();
        Self {
            threshold: cfg.threshold,
            inner_width: cfg.inner_width,
            inner_height: cfg.inner_height,
            canvas_width: cfg.canvas_width,
            canvas_height: cfg.canvas_height,
            foreground: cfg.foreground,
            background: cfg.background,
            settle: cfg.settle,
            parallel: cfg.parallel,
        }
    }
}

impl From<CanonConfigJson> for CanonConfig {
    fn from(value: CanonConfigJson) -> Self {
        Self {
            threshold: value.threshold,
            inner_width: value.inner_width,
            inner_height: value.inner_height,
            canvas_width: value.canvas_width,
            canvas_height: value.canvas_height,
            foreground: value.foreground,
            background: value.background,
            settle: value.settle,
            parallel: value.parallel,
            ..CanonConfig::default()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RankConfigJson {
    window: usize,
    k1: f64,
    k2: f64,
    data_range: f64,
    sample_covariance: bool,
    parallel: bool,
}

impl Default for RankConfigJson {
    fn default() -> Self {
        let cfg = RankConfig::default();
        Self {
            window: cfg.ssim.window,
            k1: cfg.ssim.k1,
            k2: cfg.ssim.k2,
            data_range: cfg.ssim.data_range,
            sample_covariance: cfg.ssim.sample_covariance,
            parallel: cfg.parallel,
        }
    }
}

impl From<RankConfigJson> for RankConfig {
    fn from(value: RankConfigJson) -> Self {
        Self {
            ssim: SsimConfig {
                window: value.window,
                k1: value.k1,
                k2: value.k2,
                data_range: value.data_range,
                sample_covariance: value.sample_covariance,
            },
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    canon: CanonConfigJson,
    rank: RankConfigJson,
}

#[derive(Debug, Serialize)]
struct CanonicalizeSummary {
    kept: Vec<String>,
    deleted: Vec<String>,
    unreadable: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("silmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config: Config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let canon_cfg = CanonConfig::from(config.canon);
    let rank_cfg = RankConfig::from(config.rank);

    match cli.command {
        None => Err("no command given; see --help".into()),
        Some(Command::Canonicalize { dir }) => {
            let store = DirStore::new(&dir).with_config(canon_cfg.clone());
            let batch = store.read_sources()?;
            for (id, err) in &batch.unreadable {
                eprintln!("skipping {id}: {err}");
            }
            let corpus = Corpus::build_persisted(&batch.sources, &canon_cfg, &store)?;
            let kept: Vec<String> = corpus.entries().iter().map(|e| e.id().to_string()).collect();
            let deleted = batch
                .sources
                .into_iter()
                .map(|(id, _)| id)
                .filter(|id| corpus.get(id).is_none())
                .collect();
            let unreadable = batch.unreadable.into_iter().map(|(id, _)| id).collect();
            let summary = CanonicalizeSummary {
                kept,
                deleted,
                unreadable,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Some(Command::Rank {
            query,
            data_url,
            corpus,
            limit,
            output,
        }) => {
            let image = match (query, data_url) {
                (Some(path), _) => load_image(path)?,
                (None, Some(path)) => decode_data_url(&fs::read_to_string(path)?)?,
                (None, None) => return Err("either --query or --data-url is required".into()),
            };
            let store = DirStore::new(&corpus).with_config(canon_cfg.clone());
            let corpus = Corpus::load_store(&store)?;
            let canonicalizer = Canonicalizer::new(canon_cfg)?;
            let ranker = SimilarityRanker::new().with_config(rank_cfg);

            let mut ranking = match ranker.rank_image(&image, &canonicalizer, &corpus) {
                Ok(ranking) => ranking,
                Err(SilMatchError::Degenerate { .. }) => {
                    return Err("query image contains no shape to match".into());
                }
                Err(err) => return Err(err.into()),
            };
            if let Some(limit) = limit {
                ranking.truncate(limit);
            }

            let pairs: Vec<(String, f64)> = ranking.into_iter().map(|r| (r.id, r.score)).collect();
            let json = serde_json::to_string_pretty(&pairs)?;
            match output {
                Some(path) => fs::write(path, json)?,
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}
