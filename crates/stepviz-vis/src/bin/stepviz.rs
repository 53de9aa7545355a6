//! stepviz Visualization Server
//!
//! Serve the step-by-step visualizer for trees, graphs, hash tables and heaps.

use stepviz_vis::{VisConfig, VisServer, Workbench};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepviz=info,stepviz_vis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VisConfig::from_env()?;
    tracing::info!(addr = %config.addr, "Starting stepviz");

    let server = VisServer::new(Workbench::new(&config));
    server.serve(config.addr).await?;

    Ok(())
}
