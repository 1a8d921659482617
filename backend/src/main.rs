use rust_embed::{EmbeddedFile, RustEmbed};
use std::{
    env,
    net::IpAddr,
    path::PathBuf,
    process,
    str::FromStr,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    attachments::AttachmentStore,
    error::{Error, Result},
    storage::Mailbox,
    web_server::http_server,
};

mod attachments;
mod error;
mod storage;
mod types;
mod web_server;


pub const VERSION_BE: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
    storage: RwLock<Mailbox>,
    attachments: AttachmentStore,
    prefix: String,
    index: Option<String>,
}

impl AppState {
    fn read_storage(&self) -> Result<RwLockReadGuard<'_, Mailbox>> {
        self.storage
            .read()
            .map_err(|e| Error::Storage(e.to_string()))
    }

    fn write_storage(&self) -> Result<RwLockWriteGuard<'_, Mailbox>> {
        self.storage
            .write()
            .map_err(|e| Error::Storage(e.to_string()))
    }
}

#[derive(RustEmbed)]
#[folder = "../frontend/dist"]
pub struct Asset;

#[derive(Debug, Clone)]
pub(crate) struct Config {
    http_host: IpAddr,
    http_port: u16,
    prefix: String,
    upload_dir: PathBuf,
    own_address: String,
    seed_fixtures: bool,
}

impl Config {
    fn from_env() -> Self {
        // construct path prefix
        let prefix = env::var("WEBMAIL_PREFIX").unwrap_or_default();

        Config {
            http_host: parse_env_var("HTTP_HOST", [127, 0, 0, 1].into()),
            http_port: parse_env_var("HTTP_PORT", 3001),
            prefix: format!("/{}", prefix.trim_matches('/')),
            upload_dir: parse_env_var("UPLOAD_DIR", PathBuf::from("uploads")),
            own_address: parse_env_var("OWN_ADDRESS", "you@company.com".to_owned()),
            seed_fixtures: env::var("SEED_FIXTURES")
                .map_or(true, |v| v.to_ascii_lowercase().parse().unwrap_or(true)),
        }
    }
}

/// get a configuration from the environment or return default value
fn parse_env_var<T: FromStr>(name: &'static str, default: T) -> T {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

fn load_index(path_prefix: &str) -> Option<String> {
    let index: EmbeddedFile = Asset::get("index.html")?;
    let index = String::from_utf8(index.data.to_vec()).ok()?;
    let path_prefix = if path_prefix == "/" { "" } else { path_prefix };

    // add path prefix to asset includes
    Some(
        index
            .replace("href=\"/", &format!("href=\"{path_prefix}/static/"))
            .replace(
                "'/webmail-frontend",
                &format!("'{path_prefix}/static/webmail-frontend"),
            ),
    )
}

/// build the application state and serve it on `listener` until the token
/// is cancelled
pub(crate) async fn serve(
    config: Config,
    listener: TcpListener,
    token: CancellationToken,
) -> Result<()> {
    let attachments = AttachmentStore::new(&config.upload_dir);
    attachments.ensure_directory().await?;

    let mailbox = if config.seed_fixtures {
        Mailbox::seeded(config.own_address)
    } else {
        Mailbox::empty(config.own_address)
    };

    let app_state = Arc::new(AppState {
        storage: RwLock::new(mailbox),
        attachments,
        index: load_index(&config.prefix),
        prefix: config.prefix,
    });

    let name = http_server(listener, app_state, token).await?;
    info!("{name} finished");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for ctrl-c {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub(crate) async fn run() -> Result<()> {
    let config = Config::from_env();

    info!(
        "Webmail {VERSION_BE} starting on {}:{} (prefix {}, uploads in {})",
        config.http_host,
        config.http_port,
        config.prefix,
        config.upload_dir.display()
    );

    let token = CancellationToken::new();
    let shutdown = token.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown requested");
        shutdown.cancel();
    });

    let listener = TcpListener::bind((config.http_host, config.http_port)).await?;

    serve(config, listener, token).await
}

#[tokio::main]
async fn main() {
    // initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "webmail_backend=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let exit_code = match run().await {
        Err(e) => {
            error!("Webmail error {e}");
            // failure
            1
        }
        Ok(()) => {
            info!("Webmail stopped");
            // success
            0
        }
    };

    process::exit(exit_code);
}
