//! Chamados - headless active-ticket tracker
//!
//! Keeps the persisted active-ticket ledger reconciled with the backend
//! until interrupted.

use anyhow::Context as _;
use chamados_domain::format_elapsed;
use chamados_lib::utils::logging::{error_label, init_tracing};
use chamados_lib::AppContext;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = chamados_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env file loaded"),
    }

    let context = AppContext::new_with_config(config).context("failed to build context")?;
    context.start().await.context("failed to start tracking")?;
    info!("Chamados started");

    let mut active = context.tracker.subscribe_active();
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                info!("Shutdown requested");
                break;
            }
            changed = active.changed() => {
                if changed.is_err() {
                    break;
                }
                let entries = active.borrow_and_update().clone();
                let elapsed = context.tracker.elapsed();
                for entry in &entries {
                    let seconds = elapsed.get(&entry.ticket_id).copied().unwrap_or_default();
                    info!(
                        ticket_id = %entry.ticket_id,
                        started_at = %entry.started_at,
                        elapsed = %format_elapsed(seconds),
                        "Active ticket"
                    );
                }
                info!(count = entries.len(), "Active tickets changed");
            }
        }
    }

    if let Err(err) = context.shutdown().await {
        error!(error = %err, kind = error_label(&err), "Shutdown failed");
        return Err(err.into());
    }

    info!("Chamados stopped");
    Ok(())
}
