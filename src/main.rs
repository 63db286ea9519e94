//! hearth-chat - persona-based advisory chat for parents
//!
//! A small chat front end that:
//! - presents a fixed team of advisor personas
//! - routes each message to a hosted completion endpoint with the persona's
//!   system prompt and full history
//! - keeps one in-memory conversation per persona for the life of the process

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use hearth_chat::config::{self, Config};
use hearth_chat::personas::PersonaRegistry;
use hearth_chat::provider::OpenAiProvider;
use hearth_chat::repl::{self, colors};
use hearth_chat::server;

#[derive(Parser)]
#[command(name = "hearth-chat")]
#[command(about = "Persona-based advisory chat for parents")]
struct Args {
    /// Run as HTTP server instead of REPL (for frontend integration)
    #[arg(long)]
    serve: bool,

    /// HTTP server port (default: 3000)
    #[arg(long, default_value = "3000")]
    port: u16,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,

    /// Base URL for the completions API (OpenAI-compatible gateways)
    #[arg(long, env = "OPENAI_BASE_URL")]
    api_base: Option<String>,

    /// Model identifier (fixed for the lifetime of the process)
    #[arg(long)]
    model: Option<String>,

    /// Path to a personas.toml overlay
    #[arg(long)]
    personas: Option<String>,

    /// Directory holding persona images
    #[arg(long)]
    assets: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from ~/.hearth/.env or current dir)
    let env_path = config::hearth_dir().join(".env");
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    } else {
        let _ = dotenvy::dotenv(); // fallback to current dir
    }

    // Initialize logging
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    // Load config file (~/.hearth/config.toml)
    let config = Config::load();

    // Resolve values: CLI args > env vars (handled by clap) > config file
    let api_key = args.openai_api_key.or(config.openai_api_key);
    let api_base = args.api_base.or(config.api_base);
    let model = args.model.or(config.model);
    let personas_path = args.personas.or(config.personas).map(PathBuf::from);
    let assets_dir = args
        .assets
        .or(config.assets)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));

    let registry = Arc::new(PersonaRegistry::load(personas_path.as_deref()));
    let provider = OpenAiProvider::new(api_key, api_base, model);

    use colors::ansi::*;

    // Pretty startup banner
    println!();
    println!("{}", colors::banner_accent(&format!("  hearth-chat {}", env!("CARGO_PKG_VERSION"))));
    println!("{}", colors::separator(50));
    println!("{}", colors::banner_line("Model", provider.model()));
    println!(
        "{}",
        colors::banner_line(
            "API key",
            &if provider.has_credential() {
                format!("{}configured{}", GREEN, RESET)
            } else {
                format!("{}missing{}", YELLOW, RESET)
            }
        )
    );
    println!(
        "{}",
        colors::banner_line("Advisors", &registry.len().to_string())
    );
    println!(
        "{}",
        colors::banner_line("Mode", if args.serve { "server" } else { "repl" })
    );
    println!("{}", colors::separator(50));
    println!();

    if !provider.has_credential() {
        println!(
            "{}",
            colors::warning(
                "OPENAI_API_KEY is not set; replies will show an error until it is configured."
            )
        );
        println!();
    }

    let provider = Arc::new(provider);

    if args.serve {
        server::run(args.port, registry, provider, assets_dir).await
    } else {
        repl::run(registry, provider).await
    }
}
