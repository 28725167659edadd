use tracing::{error, info};

use dbdrive::{Config, DbDrive};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = dbdrive::logging::init(&config) {
        eprintln!("Failed to initialize logging: {e}");
        dbdrive::logging::init_console_only(&config.logging.level);
    }

    info!("dbdrive - relational file tree");

    let drive = match DbDrive::open(&config).await {
        Ok(drive) => drive,
        Err(e) => {
            error!("Failed to open drive: {}", e);
            std::process::exit(1);
        }
    };

    match drive.stats().await {
        Ok(stats) => info!(
            "Tree {} in {} holds {} bytes",
            drive.tree_id(),
            config.database.path,
            stats.used_bytes
        ),
        Err(e) => error!("Failed to read drive stats: {}", e),
    }
}
