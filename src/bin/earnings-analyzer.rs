//! CLI binary for earnings-analyzer.
//!
//! A thin shim over the library crate: `serve` runs the HTTP service,
//! `analyze` runs one transcript and prints the response envelope.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use earnings_analyzer::pipeline::input::load_source;
use earnings_analyzer::{server, Analyzer, AnalyzerConfig, ResponseEnvelope, ServerConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on port 3000
  earnings-analyzer serve

  # Restrict CORS to the web front-end
  earnings-analyzer serve --port 8080 --cors-origin http://localhost:5173

  # Analyse a local PDF or text file
  earnings-analyzer analyze q3-call.pdf --pretty
  earnings-analyzer analyze q3-call.txt

  # Analyse from a URL or stdin
  earnings-analyzer analyze https://example.com/q3-call.pdf
  cat q3-call.txt | earnings-analyzer analyze -

  # Use a specific model
  earnings-analyzer analyze --provider openai --model gpt-4.1-mini q3-call.pdf

ENDPOINTS (serve):
  POST /api/analyze-transcript   application/json {"text": "..."}
                                 multipart/form-data with a 'pdf' file part
                                 application/pdf raw body
  GET  /api/health               {"status": "OK", "timestamp", "service"}

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (preferred when set)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (otherwise the system library)
  PORT                    Listening port for `serve`
  CORS_ORIGIN             Allowed cross-origin caller for `serve`
  RUST_LOG                Log filter, e.g. earnings_analyzer=debug

A .env file in the working directory is loaded before arguments are parsed.
"#;

/// Analyse earnings-call transcripts with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "earnings-analyzer",
    version,
    about = "Analyse earnings-call transcripts with an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "ANALYZER_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, global = true, env = "ANALYZER_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Analyse one transcript and print the JSON envelope.
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Bind address.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listening port.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Allowed cross-origin caller; any origin when unset.
    #[arg(long, env = "CORS_ORIGIN")]
    cors_origin: Option<String>,

    /// Worker threads; one per core when unset.
    #[arg(long, env = "ANALYZER_WORKERS")]
    workers: Option<usize>,

    /// Largest accepted request body in bytes.
    #[arg(long, env = "ANALYZER_MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    max_upload_bytes: usize,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Local file path, HTTP/HTTPS URL, or `-` for stdin. PDF or UTF-8 text.
    input: String,

    /// Pretty-print the JSON envelope.
    #[arg(long)]
    pretty: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "ANALYZER_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "ANALYZER_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "ANALYZER_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Retries on LLM failure.
    #[arg(long, env = "ANALYZER_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// LLM call timeout in seconds.
    #[arg(long, env = "ANALYZER_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Path to the libpdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Password for encrypted PDFs.
    #[arg(long, env = "ANALYZER_PDF_PASSWORD")]
    pdf_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
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

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Analyze(args) => analyze(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = build_config(&args.model, 120)?;
    let analyzer = Analyzer::from_config(&config).context("Failed to set up the LLM provider")?;

    let server_config = ServerConfig {
        host: args.host,
        port: args.port,
        cors_origin: args.cors_origin.filter(|o| !o.is_empty()),
        workers: args.workers,
        max_upload_bytes: args.max_upload_bytes,
        ..ServerConfig::default()
    };

    server::run(server_config, analyzer)
        .await
        .context("HTTP server failed")
}

async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let config = build_config(&args.model, args.download_timeout)?;
    let analyzer = Analyzer::from_config(&config).context("Failed to set up the LLM provider")?;

    let envelope = match load_source(&args.input, config.download_timeout_secs).await {
        Ok(input) => analyzer.analyze_to_envelope(input).await,
        Err(e) => ResponseEnvelope::from(&e),
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    }
    .context("Failed to serialise output")?;
    println!("{json}");

    if !envelope.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `AnalyzerConfig`.
fn build_config(args: &ModelArgs, download_timeout: u64) -> Result<AnalyzerConfig> {
    let mut builder = AnalyzerConfig::builder()
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .max_retries(args.max_retries)
        .api_timeout_secs(args.api_timeout)
        .download_timeout_secs(download_timeout);

    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref path) = args.pdfium_lib {
        builder = builder.pdfium_lib_path(path);
    }
    if let Some(ref pwd) = args.pdf_password {
        builder = builder.pdf_password(pwd);
    }

    builder.build().context("Invalid configuration")
}
