//! otc-server: HTTP service for issuing and verifying one-time codes.
//!
//! A thin binding over `otc-core`. Service configuration comes from the
//! environment (`ADMIN_EMAIL`, `REDIS_URL`, `OTC_DEFAULT_TTL_SECS`), the
//! bind address from the command line.

use anyhow::Result;
use clap::Parser;
use otc_core::{ExpiringStore, MemoryStore, OtcConfig, OtcManager, SingleAdmin};
use otc_server::http::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "otc-server")]
#[command(about = "One-time code issuance and verification service")]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        "otc_server=debug,otc_core=debug,tower_http=debug"
    } else {
        "otc_server=info,otc_core=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting otc-server");

    let config = OtcConfig::from_env()?;
    info!("Admin identity: {}", config.admin_email);
    info!("Default code TTL: {}s", config.default_ttl.as_secs());

    let store = build_store(&config).await?;
    let state = AppState {
        manager: Arc::new(OtcManager::with_default_ttl(store, config.default_ttl)),
        admin: Arc::new(SingleAdmin::new(config.admin_email.clone())),
    };

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, http::router(state)).await?;

    Ok(())
}

/// Select the backing store from configuration: Redis when `REDIS_URL` is
/// set, the in-memory store otherwise.
async fn build_store(config: &OtcConfig) -> Result<Arc<dyn ExpiringStore>> {
    if let Some(url) = &config.redis_url {
        #[cfg(feature = "redis-store")]
        {
            let store = otc_core::RedisStore::connect(url).await?;
            // The URL may embed a password; log only the parsed address
            info!("Using redis backing store at {}", store.address());
            return Ok(Arc::new(store));
        }
        #[cfg(not(feature = "redis-store"))]
        {
            let _ = url;
            anyhow::bail!("REDIS_URL is set but this build lacks the redis-store feature");
        }
    }
    warn!("REDIS_URL not set; codes will live in process memory and vanish on restart");
    Ok(Arc::new(MemoryStore::new()))
}
