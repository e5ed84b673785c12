use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Config;
use crate::model::{PhotoBlob, ReportRecord};
use crate::report::ReportEngine;
use crate::sink::{EmailRelay, LocalSave};

#[derive(Parser, Debug)]
#[command(name = "fieldreport")]
#[command(about = "Render field-service form submissions to PDF reports")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./fieldreport.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a record (JSON file, or `-` for stdin).
    Render {
        record: PathBuf,
        /// Report title, e.g. "Material Turnover".
        #[arg(long)]
        title: String,
        /// Save into this directory instead of `[output].dir`.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Email through the relay instead of saving.
        #[arg(long, requires = "subject")]
        email_to: Option<String>,
        #[arg(long, requires = "email_to")]
        subject: Option<String>,
        /// Attach a photo file. Repeatable.
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },
    /// Print an example record.
    Example {},
}

pub async fn dispatch(args: Args) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    init_logging(&args, &cfg)?;

    match args.cmd {
        Command::Render {
            record,
            title,
            out_dir,
            email_to,
            subject,
            photos,
        } => {
            let request = RenderRequest {
                record,
                title,
                out_dir,
                email_to,
                subject,
                photos,
            };
            render(cfg, request).await
        }
        Command::Example {} => {
            print!("{}", example_record_json());
            Ok(())
        }
    }
}

struct RenderRequest {
    record: PathBuf,
    title: String,
    out_dir: Option<PathBuf>,
    email_to: Option<String>,
    subject: Option<String>,
    photos: Vec<PathBuf>,
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p).with_context(|| format!("loading config: {}", p.display()));
    }
    let default = PathBuf::from("fieldreport.toml");
    if default.exists() {
        Config::load(&default).with_context(|| "loading ./fieldreport.toml")
    } else {
        Ok(Config::default())
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<()> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))
}

async fn render(cfg: Config, req: RenderRequest) -> Result<()> {
    let raw = read_record(&req.record)?;
    let mut record = ReportRecord::from_json(&raw)
        .with_context(|| format!("parsing record: {}", req.record.display()))?;

    let mut attached = Vec::with_capacity(req.photos.len());
    for path in &req.photos {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading photo: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        attached.push(PhotoBlob::from_bytes(name, bytes));
    }
    if !attached.is_empty() {
        record.push_photos(attached);
    }

    let relay_cfg = cfg.relay.clone();
    let out_dir = req
        .out_dir
        .unwrap_or_else(|| PathBuf::from(&cfg.output.dir));
    let engine = ReportEngine::new(cfg);

    let filename = match (req.email_to, req.subject) {
        (Some(to), Some(subject)) => {
            let relay = EmailRelay::new(
                relay_cfg.url,
                to,
                subject,
                Duration::from_secs(relay_cfg.timeout_seconds),
            )?;
            engine.render_report(&record, &req.title, &relay).await?
        }
        _ => {
            let sink = LocalSave::new(out_dir);
            engine.render_report(&record, &req.title, &sink).await?
        }
    };

    info!(filename = %filename, "done");
    println!("{}", filename);
    Ok(())
}

fn read_record(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading record from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading record: {}", path.display()))
    }
}

pub fn example_record_json() -> &'static str {
    r##"{
  "date": "2024-05-01",
  "jobName": "Lincoln HS",
  "jobNumber": "1234",
  "installerName": "Pat Rivera",
  "turnoverItems": "2 keys\n1 remote for the scoreboard",
  "recipientName": "Dana Lee",
  "recipientType": "Athletic Director",
  "signature": "",
  "photos": []
}
"##
}
