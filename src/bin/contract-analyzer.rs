//! Server binary for contract-analyzer.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalyzerConfig`, loads the license table and serves the router.

use anyhow::{Context, Result};
use clap::Parser;
use contract_analyzer::{
    router, AnalyzerConfig, AppState, ContractAnalyzer, LicenseRegistry, OpenAiModelFactory,
    PdfiumBackend, StaticLicenseRegistry,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "contract-analyzer",
    version,
    about = "Serve POST /analizar/: PDF contract in, 20-row legal summary table out",
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// Host address to bind to.
    #[arg(long, env = "CONTRACT_ANALYZER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// JSON file mapping license keys to customer ids. Built-in table if unset.
    #[arg(long, env = "CONTRACT_ANALYZER_LICENSES")]
    licenses: Option<PathBuf>,

    /// Model used for both page transcription and the summary table.
    #[arg(long, env = "CONTRACT_ANALYZER_MODEL", default_value = "gpt-4o")]
    model: String,

    /// Rendering DPI for scanned pages (72–600).
    #[arg(long, env = "CONTRACT_ANALYZER_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Longest rendered page edge in pixels.
    #[arg(long, env = "CONTRACT_ANALYZER_MAX_PIXELS", default_value_t = 5000)]
    max_pixels: u32,

    /// Page transcriptions in flight at once (output order is always page order).
    #[arg(short, long, env = "CONTRACT_ANALYZER_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Output-token cap per page transcription.
    #[arg(long, env = "CONTRACT_ANALYZER_TRANSCRIPTION_TOKENS", default_value_t = 2048)]
    transcription_max_tokens: usize,

    /// Output-token cap for the summary table.
    #[arg(long, env = "CONTRACT_ANALYZER_SUMMARY_TOKENS", default_value_t = 4096)]
    summary_max_tokens: usize,

    /// Maximum upload size in MiB.
    #[arg(long, env = "CONTRACT_ANALYZER_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, env = "CONTRACT_ANALYZER_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Configuration ────────────────────────────────────────────────────
    let mut builder = AnalyzerConfig::builder()
        .model(&cli.model)
        .dpi(cli.dpi)
        .max_rendered_pixels(cli.max_pixels)
        .transcription_concurrency(cli.concurrency)
        .transcription_max_tokens(cli.transcription_max_tokens)
        .summary_max_tokens(cli.summary_max_tokens);
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }
    let config = builder.build().context("invalid configuration")?;

    let registry: Arc<dyn LicenseRegistry> = match cli.licenses {
        Some(ref path) => Arc::new(
            StaticLicenseRegistry::from_json_file(path).context("failed to load license table")?,
        ),
        None => {
            info!("Using built-in license table");
            Arc::new(StaticLicenseRegistry::builtin())
        }
    };

    // ── PDF engine ───────────────────────────────────────────────────────
    let pdf = PdfiumBackend::from_config(&config);
    if let Err(e) = pdf.probe() {
        // Keep serving: every analysis will fail with this same error as a 500.
        warn!("{}", e);
    }

    let models = OpenAiModelFactory::new(&config);
    info!(
        "Model: {}, DPI: {}, transcription concurrency: {}",
        config.model, config.dpi, config.transcription_concurrency
    );
    let analyzer = ContractAnalyzer::new(Arc::new(pdf), Arc::new(models), config);

    let state = AppState::new(registry, analyzer)
        .with_max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024));
    let app = router(state);

    // ── Serve ────────────────────────────────────────────────────────────
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
