use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use mgallery::{
    Config, create_app,
    gallery::{PaginationCursor, group_albums, render_page},
    ingest::Ingestor,
    platform::{LocalFileReader, MemoryStore, MonotonicClock, SelectedFile, SystemClock},
    startup_checks,
    storage::RecordStore,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Ingest a local folder and print one page of the resulting gallery
    Preview {
        directory: PathBuf,

        /// One-based page to print
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.config)?;

    match cli.command {
        Some(Commands::Preview { directory, page }) => preview(config, &directory, page).await,
        Some(Commands::Serve {
            port,
            host,
            quit_after,
        }) => run_server(config, port, host, quit_after).await,
        None => run_server(config, None, None, None).await,
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        let config = toml_edit::de::from_str::<Config>(&config_content)?;
        info!("Configuration loaded from: {:?}", config_path);
        Ok(config)
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

async fn preview(
    config: Config,
    directory: &Path,
    page: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = SelectedFile::from_directory(directory)?;
    info!("Found {} files under {:?}", files.len(), directory);

    let records = RecordStore::with_keys(
        Arc::new(MemoryStore::with_quota(config.storage.session_quota_bytes)),
        config.storage.records_key.clone(),
        config.storage.selected_album_key.clone(),
    );
    let ingestor = Ingestor::new(
        records,
        Arc::new(LocalFileReader),
        Arc::new(MonotonicClock::new(SystemClock)),
        config.gallery.default_album.clone(),
    );

    let outcome = ingestor.ingest(files).await?;
    if let Some(e) = &outcome.storage_error {
        tracing::warn!("Selection would not fit in session storage: {}", e);
    }
    println!("{}", outcome.summary());

    let mut records = outcome.records;
    let mut cursor = PaginationCursor::new(config.gallery.images_per_page);
    while cursor.page() < page && cursor.next(records.len()) {}
    let rendered = render_page(&mut records, &cursor);

    for item in &rendered.items {
        println!("{:>4}  {}", item.index, item.caption);
    }
    if rendered.controls.visible {
        println!("{}", rendered.controls.info);
    }

    println!();
    for album in group_albums(&records, &config.gallery.default_album) {
        println!("{} ({} images)", album.name, album.image_count);
    }

    Ok(())
}

async fn run_server(
    config: Config,
    port: Option<u16>,
    host: Option<String>,
    quit_after: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting {} server", config.app.name);
    info!("Template directory: {:?}", config.templates.directory);
    info!(
        "Static files directory: {:?}",
        config.static_files.directory
    );
    info!("Local storage file: {:?}", config.storage.local_storage_path);

    if let Err(errors) = startup_checks::perform_startup_checks(&config).await {
        for error in &errors {
            tracing::error!("Startup check failed: {}", error);
        }
        if errors.iter().any(|e| e.is_critical()) {
            tracing::error!("Critical startup check failed, exiting");
            return Err("Critical startup check failed".into());
        }
        tracing::warn!("Non-critical startup checks failed, continuing");
    }

    let app = create_app(config).await;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}
