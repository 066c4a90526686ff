use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gifterm", version, about = "Play GIFs in your terminal")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for a GIF and play it (underscores read as spaces).
    Search {
        /// Search terms.
        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,
        #[command(flatten)]
        play: PlayArgs,
    },
    /// Fetch an image by URL and play it.
    Url {
        /// Direct link ending in .gif, .png, .jpg, .jpeg or .webp.
        url: String,
        #[command(flatten)]
        play: PlayArgs,
    },
    /// Play a local image file.
    File {
        /// Path to a GIF or still image.
        path: PathBuf,
        /// Play the animation backwards.
        #[arg(long)]
        reverse: bool,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Play the animation backwards.
    #[arg(long)]
    reverse: bool,

    /// Show a still preview instead of the animation.
    #[arg(long)]
    preview: bool,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output width in terminal cells.
    #[arg(long, global = true)]
    columns: Option<u32>,

    /// Output height in terminal cells.
    #[arg(long, global = true)]
    rows: Option<u32>,

    /// Worker threads for frame rendering.
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Search API key.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Directory for the persistent frame cache.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Render every request from scratch.
    #[arg(long, global = true, conflicts_with = "cache_dir")]
    no_cache: bool,

    /// Client identity to rate-limit this request under.
    #[arg(long, global = true)]
    identity: Option<String>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gifterm=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gifterm: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = load_config(&cli.global)?;
    let pipeline = gifterm::Pipeline::builder(&cfg).build()?;
    let service = gifterm::Service::start(&cfg, pipeline)?;

    let req = match cli.cmd {
        Command::Search { terms, play } => gifterm::PlayRequest::search(terms.join(" "))
            .reversed(play.reverse)
            .preview(play.preview),
        Command::Url { url, play } => gifterm::PlayRequest::url(url)
            .reversed(play.reverse)
            .preview(play.preview),
        Command::File { path, reverse } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read image '{}'", path.display()))?;
            gifterm::PlayRequest::bytes(bytes).reversed(reverse)
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let origin = service.serve(cli.global.identity.as_deref(), &req, &mut out)?;
    out.flush().context("flush stdout")?;
    tracing::debug!(?origin, "done");
    Ok(())
}

fn load_config(args: &GlobalArgs) -> anyhow::Result<gifterm::GiftermConfig> {
    let mut cfg = match &args.config {
        Some(path) => gifterm::GiftermConfig::from_json_path(path)?,
        None => gifterm::GiftermConfig::default(),
    };
    if let Some(columns) = args.columns {
        cfg.render.columns = columns;
    }
    if let Some(rows) = args.rows {
        cfg.render.rows = rows;
    }
    if let Some(threads) = args.threads {
        cfg.render.threads = Some(threads);
    }
    if let Some(key) = &args.api_key {
        cfg.search.api_key = key.clone();
    }
    if let Some(dir) = &args.cache_dir {
        cfg.cache.enabled = true;
        cfg.cache.dir = Some(dir.clone());
    }
    if args.no_cache {
        cfg.cache.enabled = false;
    }
    cfg.validate()?;
    Ok(cfg)
}
