use clap::{Parser, Subcommand};
use lingo::config::{self, Config};
use lingo::pipeline;
use lingo::translate::PapagoClient;

#[derive(Parser)]
#[command(name = "lingo")]
#[command(about = "Lingo CLI — LINE translation relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: LINGO_CONFIG_PATH or ~/.lingo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook gateway (GET / health check, POST /webhook for LINE events).
    Serve {
        /// Config file path (default: LINGO_CONFIG_PATH or ~/.lingo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Detect, resolve the target language, and translate one message without replying.
    /// Korean text may end with a tag such as `.fr` to pick the target language.
    Translate {
        /// Config file path (default: LINGO_CONFIG_PATH or ~/.lingo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Message text
        text: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("lingo {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Translate { config, text }) => {
            if let Err(e) = run_translate(config, &text).await {
                log::error!("translate failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(config::default_config_path);
    let dir = lingo::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    println!(
        "gateway binds 127.0.0.1 by default; to accept LINE webhooks on a public address set gateway.bind and channels.line.channelSecret (or LINE_CHANNEL_SECRET)"
    );
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    lingo::gateway::run_gateway(config, path).await
}

fn papago_client(config: &Config) -> anyhow::Result<PapagoClient> {
    let credentials = config::resolve_papago_credentials(config).ok_or_else(|| {
        anyhow::anyhow!("papago credentials not configured (set NAVER_CLIENT_ID and NAVER_CLIENT_SECRET)")
    })?;
    Ok(PapagoClient::new(&config.papago, credentials)?)
}

async fn run_translate(config_path: Option<std::path::PathBuf>, text: &str) -> anyhow::Result<()> {
    let (config, _) = config::load_config(config_path)?;
    let papago = papago_client(&config)?;
    let (request, translation) = pipeline::translate_text(&papago, &papago, text).await?;
    println!("{} -> {}: {}", request.source, request.target, request.text);
    println!("{}", translation.translated_text);
    Ok(())
}
