//! NeoKrishi CLI Module
//!
//! Command-line entry points: run the API server or classify a single image
//! offline with the same model and labels.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::inference::{ClassLabelTable, ImageClassificationService, OnnxClassifier, ResizeFilter};
use crate::server::{run_server, ServerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 50; // box inner width

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim(&format!("┌{}┐", "─".repeat(W + 1)))); }
fn line_box_bottom() { println!("  {}", dim(&format!("└{}┘", "─".repeat(W + 1)))); }

/// Box line; `visible_len` is the width of `content` without ANSI codes.
fn line_box(content: &str, visible_len: usize) {
    let pad = W.saturating_sub(visible_len);
    println!("  {}{}{}{}", dim("│ "), content, " ".repeat(pad), dim("│"));
}

fn kv(key: &str, val: &str) {
    let visible = key.chars().count() + 1 + val.chars().count();
    line_box(&format!("{} {}", muted(key), val.white()), visible);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "neokrishi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Agricultural advisory API: leaf disease detection, soil, fertilizer, crop and market advice")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server port (env API_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host (env API_HOST)
        #[arg(long)]
        host: Option<String>,

        /// ONNX classifier artifact (env MODEL_PATH)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Class labels, one per line (env LABELS_PATH)
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// JSON advisory tables replacing the built-in ones (env ADVISORY_TABLES)
        #[arg(long)]
        tables: Option<PathBuf>,
    },

    /// Classify a single leaf image and print the prediction
    Classify {
        /// Image file (JPEG, PNG, WebP or BMP)
        #[arg(short, long)]
        image: PathBuf,

        /// ONNX classifier artifact (env MODEL_PATH)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Class labels, one per line (env LABELS_PATH)
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// Resampling filter (nearest, bilinear)
        #[arg(long, default_value = "bilinear")]
        filter: String,
    },
}

fn parse_filter(name: &str) -> anyhow::Result<ResizeFilter> {
    match name.to_lowercase().as_str() {
        "nearest" => Ok(ResizeFilter::Nearest),
        "bilinear" | "triangle" => Ok(ResizeFilter::Bilinear),
        other => anyhow::bail!("unknown resize filter '{other}' (expected nearest or bilinear)"),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
    labels: Option<PathBuf>,
    tables: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(model) = model {
        config.model_path = model;
    }
    if let Some(labels) = labels {
        config.labels_path = labels;
    }
    if tables.is_some() {
        config.tables_path = tables;
    }

    println!();
    line_box_top();
    kv("NeoKrishi API", &format!("v{}", env!("CARGO_PKG_VERSION")));
    kv("Listen ", &format!("http://{}:{}", config.host, config.port));
    kv("Model  ", &config.model_path.display().to_string());
    kv("Labels ", &config.labels_path.display().to_string());
    line_box_bottom();
    println!();

    run_server(config).await
}

pub fn cmd_classify(
    image: &PathBuf,
    model: Option<PathBuf>,
    labels: Option<PathBuf>,
    filter: &str,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    if let Some(model) = model {
        config.model_path = model;
    }
    if let Some(labels) = labels {
        config.labels_path = labels;
    }
    let inference = config.inference.clone().with_filter(parse_filter(filter)?);

    let classifier = OnnxClassifier::load(&config.model_path, inference.input_shape())?;
    let label_table = ClassLabelTable::from_file(&config.labels_path)?;
    let service = ImageClassificationService::new(inference, Arc::new(classifier), label_table)?;

    let bytes = std::fs::read(image)?;
    let start = Instant::now();
    let prediction = service.classify_bytes(&bytes)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    println!();
    println!("  {} {}", ok("✓"), image.display());
    println!("  {} {}", muted("disease   "), prediction.label.white().bold());
    println!("  {} {}", muted("confidence"), prediction.confidence_percent().white());
    println!("  {} {}", muted("latency   "), dim(&format!("{elapsed_ms:.1} ms")));
    println!();
    Ok(())
}
