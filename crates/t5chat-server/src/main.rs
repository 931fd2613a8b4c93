use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use t5chat_runtime::{Device, DevicePreference, ModelCache, PretrainedProvider};
use t5chat_server::{run_server, AppState, ServerConfig};
use tracing_subscriber::EnvFilter;

/// T5 Chat Bot: a browser chat page backed by a seq2seq model.
#[derive(Parser)]
#[command(name = "t5chat-server", version)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "T5CHAT_ADDR", default_value = "127.0.0.1:8501")]
    addr: SocketAddr,

    /// Pretrained model name.
    #[arg(long, env = "T5CHAT_MODEL", default_value = "t5-large")]
    model: String,

    /// Directory holding `<model>/tokenizer.json`; the built-in vocabulary is used without it.
    #[arg(long, env = "T5CHAT_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Device to run the model on: auto, cpu or cuda.
    #[arg(long, env = "T5CHAT_DEVICE", default_value = "auto")]
    device: DevicePreference,

    /// Maximum number of live chat sessions.
    #[arg(long, env = "T5CHAT_MAX_SESSIONS", default_value_t = 4096)]
    max_sessions: usize,

    /// Fixed sampling seed for reproducible replies.
    #[arg(long, env = "T5CHAT_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,t5chat=debug")),
        )
        .init();

    let cli = Cli::parse();

    let device = Device::select(cli.device)?;
    let provider = match cli.model_dir {
        Some(dir) => PretrainedProvider::from_dir(dir),
        None => PretrainedProvider::builtin(),
    };
    let models = ModelCache::new(cli.model.clone(), Arc::new(provider));

    let mut config = ServerConfig::default().with_max_sessions(cli.max_sessions);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    tracing::info!(model = %cli.model, %device, max_sessions = cli.max_sessions, "starting t5chat server");

    let state = AppState::new(models, device, config);
    run_server(state, cli.addr).await?;
    Ok(())
}
