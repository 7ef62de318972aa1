//! Server initialization utilities
//!
//! Tracing setup and the stdio serving loop shared by MCP server binaries.

use rmcp::{ServerHandler, ServiceExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for an MCP server
///
/// Logs go to stderr because stdout carries the MCP protocol. `RUST_LOG`
/// is honored, with `<crate_name>=info` added as a default directive.
/// `LOG_FORMAT=json` switches to structured JSON lines.
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}

/// Serve `server` over stdio until the client disconnects or Ctrl-C arrives
///
/// Returning from this function is the shutdown signal for the caller: any
/// resources the server borrows (database handles and the like) are still
/// owned by the caller and should be released right after.
pub async fn serve_stdio<S>(server: S) -> anyhow::Result<()>
where
    S: ServerHandler,
{
    let service = server.serve(rmcp::transport::stdio()).await?;

    tracing::info!("Server running, waiting for requests...");

    tokio::select! {
        quit = service.waiting() => {
            let reason = quit?;
            tracing::info!(?reason, "Client session ended");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Interrupt received");
        }
    }

    tracing::info!("Server shutting down");
    Ok(())
}
