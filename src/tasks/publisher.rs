//! Output Publisher Task
//!
//! Drains the discovery channel into the HTTP state and the file_sd output.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::api::AppState;
use crate::discovery::TargetGroup;
use crate::output::FileSdWriter;

/// Spawns the task that publishes every batch received on `rx`.
///
/// Each batch replaces the one served on `/targets` and, when a writer is
/// given, is written to disk. A failed write is logged and the next batch is
/// still processed. The task ends when `shutdown` is cancelled or the sender
/// side is dropped.
pub fn spawn_publisher(
    mut rx: mpsc::Receiver<Vec<TargetGroup>>,
    state: AppState,
    writer: Option<FileSdWriter>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let groups = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                batch = rx.recv() => match batch {
                    Some(groups) => groups,
                    None => break,
                },
            };

            let count = groups.len();
            if let Some(writer) = &writer {
                match writer.write(&groups).await {
                    Ok(true) => info!(path = %writer.path().display(), groups = count, "Wrote targets file"),
                    Ok(false) => debug!(path = %writer.path().display(), "Targets file unchanged"),
                    Err(err) => error!(path = %writer.path().display(), error = %err, "Failed to write targets file"),
                }
            }

            state.publish(groups).await;
            debug!(groups = count, "Published target groups");
        }

        debug!("Publisher stopped");
    })
}
