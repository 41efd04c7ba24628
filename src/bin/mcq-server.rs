//! HTTP server binary for edgequake-mcq.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `GenerationConfig` / `ServerConfig` and serves the router.
//! A `.env` file in the working directory (or a parent) is loaded first;
//! variables already set in the environment win.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_mcq::{server, AppState, GenerationConfig, ServerConfig};
use std::io;
use std::net::SocketAddr;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address (0.0.0.0:8000) with Gemini
  export GEMINI_API_KEY=...
  mcq-server

  # Another provider and model
  mcq-server --provider openai --model gpt-4.1-mini

  # Generate a quiz
  curl -F file=@chapter.pdf -F number=5 -F subject=Biology -F tone=formal \
       http://localhost:8000/generate_mcq/

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      Google Gemini API key (default provider)
  OPENAI_API_KEY      OpenAI API key
  ANTHROPIC_API_KEY   Anthropic API key
  PDFIUM_LIB_PATH     Path to an existing libpdfium (skips the download)
  RUST_LOG            Log filter, overrides --verbose / --quiet

Any of these (and the MCQ_* variables) may also be set in a .env file.
"#;

/// Serve the MCQ generation endpoint.
#[derive(Parser, Debug)]
#[command(
    name = "mcq-server",
    version,
    about = "Generate multiple-choice quizzes from uploaded PDFs with an LLM",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "MCQ_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "MCQ_PROVIDER", default_value = edgequake_mcq::config::DEFAULT_PROVIDER)]
    provider: String,

    /// LLM model ID.
    #[arg(long, env = "MCQ_MODEL", default_value = edgequake_mcq::config::DEFAULT_MODEL)]
    model: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "MCQ_TEMPERATURE", default_value_t = 0.5)]
    temperature: f32,

    /// Max LLM output tokens per call (provider default when unset).
    #[arg(long, env = "MCQ_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Largest accepted upload, in MiB.
    #[arg(long, env = "MCQ_MAX_UPLOAD_MB", default_value_t = 25)]
    max_upload_mb: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MCQ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MCQ_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing: .env may supply MCQ_* defaults and provider keys.
    let env_file = dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(path) = env_file {
        debug!("Loaded environment from {}", path.display());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let generation = build_generation_config(&cli)?;
    let server_config = ServerConfig::builder()
        .bind(cli.bind)
        .max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024))
        .build()
        .context("Invalid server configuration")?;

    info!(
        "Using provider '{}' with model '{}' (temperature {})",
        generation.provider_name, generation.model, generation.temperature
    );

    // ── Serve ────────────────────────────────────────────────────────────
    let state = AppState::from_config(&generation);
    server::serve(state, &server_config, shutdown_signal())
        .await
        .with_context(|| format!("Server on {} failed", server_config.bind))?;

    info!("Server stopped");
    Ok(())
}

/// Map CLI args to `GenerationConfig`.
fn build_generation_config(cli: &Cli) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .provider_name(&cli.provider)
        .model(&cli.model)
        .temperature(cli.temperature);

    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }

    builder.build().context("Invalid generation configuration")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, draining in-flight requests"),
        Err(e) => {
            // Without a signal handler the server just runs until killed.
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
