use crate::config::Settings;
use anyhow::{Context, Result};
use repograph_indexer::{cancel_after, ParseStats, ParserPool};
use std::path::Path;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Run the parser pool over `root`. Ctrl-C and the deadline both cancel it.
pub async fn parse_repository(root: &Path, output: &Path, settings: &Settings) -> Result<ParseStats> {
    let cancel = CancellationToken::new();
    let ctrl_c = cancel_on_ctrl_c(cancel.clone());
    let deadline = settings
        .deadline
        .map(|deadline| cancel_after(cancel.clone(), deadline));

    log::info!(
        "Parsing {} with {} workers into {}",
        root.display(),
        settings.pool.workers,
        output.display()
    );
    let result = ParserPool::new(settings.pool.clone())
        .run(root, output, cancel)
        .await;

    ctrl_c.abort();
    if let Some(deadline) = deadline {
        deadline.abort();
    }

    let report = result.with_context(|| format!("failed to parse {}", root.display()))?;
    Ok(report.stats)
}

fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    log::warn!("Interrupted; finishing in-flight files");
                    token.cancel();
                }
                Err(err) => log::debug!("Ctrl-C handler unavailable: {err}"),
            },
            () = token.cancelled() => {}
        }
    })
}
