//! Media Gateway
//!
//! Operator command line for one media server. The server is selected by
//! `MEDIA_SERVER_TYPE`, `MEDIA_SERVER_HOST` and `MEDIA_SERVER_PORT`; results
//! are printed to stdout as JSON, logs go to stderr.
//!
//! ```bash
//! MEDIA_SERVER_TYPE=srs MEDIA_SERVER_HOST=10.0.0.5 MEDIA_SERVER_PORT=1985 \
//!     media-gateway clients --stream cam1
//! ```

use clap::{Parser, Subcommand};
use common::config::ObservabilityConfig;
use media_gateway::config::Config;
use media_gateway::servers::{MediaServer, MediaServerFactory};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Media Gateway command-line interface
#[derive(Parser)]
#[command(name = "media-gateway")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the server version
    Version,

    /// List live streams
    Streams,

    /// List consuming clients
    Clients {
        /// Only clients of this stream
        #[arg(long)]
        stream: Option<String>,
    },

    /// Disconnect a client
    Kick {
        client_id: String,
    },

    /// Report whether a stream is being published
    Status {
        stream: String,
    },

    /// Print the WebRTC play locator for a stream
    PlayUrl {
        app: String,
        stream: String,
    },

    /// Play a stream over WebRTC until Ctrl+C
    Play {
        /// Stream locator (e.g. webrtc://10.0.0.5/live/cam1)
        locator: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let vars: HashMap<String, String> = env::vars().collect();
    // Invalid LOG_* values are reported by Config::from_vars below, so
    // tracing starts on defaults just to carry that error.
    init_tracing(&ObservabilityConfig::from_vars(&vars).unwrap_or_default());

    let config = Config::from_vars(&vars).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        server_type = %config.server_type,
        server_host = %config.server_host,
        server_port = config.server_port,
        "Configuration loaded successfully"
    );

    let server = MediaServerFactory::create_with(config.descriptor(), &config.adapter_options())
        .map_err(|e| {
            error!("Failed to create media server adapter: {}", e);
            e
        })?;

    if let Err(e) = run(cli.command, server.as_ref()).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }

    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    // Library events use `mg.*` targets; binary events use the crate path.
    let level = &observability.log_level;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("media_gateway={level},mg={level}").into());
    let json = observability.json_logs;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(
    command: Commands,
    server: &dyn MediaServer,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Version => print_json(&server.get_version().await?)?,
        Commands::Streams => print_json(&server.get_stream_info().await?)?,
        Commands::Clients { stream } => {
            print_json(&server.get_client_info(stream.as_deref()).await?)?;
        }
        Commands::Kick { client_id } => {
            server.kick_client(&client_id).await?;
            print_json(&serde_json::json!({ "kicked": client_id }))?;
        }
        Commands::Status { stream } => {
            let active = server.stream_status(&stream).await?;
            print_json(&serde_json::json!({ "stream": stream, "active": active }))?;
        }
        Commands::PlayUrl { app, stream } => {
            print_json(&serde_json::json!({ "url": server.play_url(&app, &stream) }))?;
        }
        Commands::Play { locator } => play(server, &locator).await?,
    }
    Ok(())
}

async fn play(server: &dyn MediaServer, locator: &str) -> Result<(), Box<dyn std::error::Error>> {
    let session = server.create_peer_session().await?;
    session.on_track(|track| {
        info!(
            kind = ?track.kind,
            mime_type = %track.mime_type,
            track_id = %track.track_id,
            "Track received"
        );
    });

    let outcome = session.play(locator).await;
    let handle = match outcome {
        Ok(handle) => handle,
        Err(e) => {
            session.close().await;
            return Err(e.into());
        }
    };
    print_json(&handle)?;

    info!("Playing, press Ctrl+C to stop");
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
    }

    session.close().await;
    info!("Playback stopped");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
