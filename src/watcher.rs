use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::WatcherConfig;
use crate::spool::PrintSpooler;

/// Watch the input directory for dropped print files and feed them through
/// the spooler until cancelled.
///
/// Files are picked up by periodic scan. After a file is first seen the loop
/// waits one settle delay before reading it, so whoever dropped it can finish
/// writing. Successfully submitted files are moved to the archive directory;
/// failures are logged and the file is left in place for the next scan.
pub async fn run_watcher(
    config: WatcherConfig,
    spooler: Arc<PrintSpooler>,
    shutdown: CancellationToken,
) {
    if let Err(e) = std::fs::create_dir_all(&config.input_dir)
        .and_then(|_| std::fs::create_dir_all(&config.archive_dir))
    {
        tracing::error!(error = %e, "Failed to create watcher directories");
        return;
    }

    tracing::info!(
        input_dir = %config.input_dir.display(),
        archive_dir = %config.archive_dir.display(),
        "Print file watcher started"
    );

    let mut scan = tokio::time::interval(Duration::from_millis(config.scan_interval_ms));
    scan.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let settle = Duration::from_millis(config.settle_delay_ms);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Print file watcher shutting down");
                break;
            }
            _ = scan.tick() => {
                let files = match pending_files(&config.input_dir) {
                    Ok(files) => files,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to scan input directory");
                        continue;
                    }
                };
                if files.is_empty() {
                    continue;
                }

                // Let droppers finish writing before we read anything
                tokio::time::sleep(settle).await;

                for path in files {
                    process_file(&config, &spooler, &path);
                }
            }
        }
    }
}

fn pending_files(input_dir: &Path) -> std::io::Result<Vec<std::path::PathBuf>> {
    let mut files: Vec<_> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn process_file(config: &WatcherConfig, spooler: &PrintSpooler, path: &Path) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::info!(file = %name, "Processing print file");

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(file = %name, error = %e, "Failed to read print file");
            return;
        }
    };

    if content.trim().is_empty() {
        tracing::warn!(file = %name, "Print file is empty, archiving without submitting");
        archive(config, path, &name, None);
        return;
    }

    match spooler.submit(&content) {
        Ok(receipt) => {
            tracing::info!(file = %name, job_id = receipt.id, qr = %receipt.filename, "QR code created");
            archive(config, path, &name, Some(receipt.id));
        }
        Err(e) => {
            // Leave the file in place; the next scan retries it
            tracing::error!(file = %name, error = %e, "Failed to submit print file");
        }
    }
}

fn archive(config: &WatcherConfig, path: &Path, name: &str, job_id: Option<u64>) {
    let mut dest = config.archive_dir.join(name);
    if dest.exists() {
        // Disambiguate repeats of the same filename
        let suffix = job_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "dup".to_string());
        dest = config.archive_dir.join(format!("{suffix}-{name}"));
    }
    match std::fs::rename(path, &dest) {
        Ok(()) => tracing::info!(file = %name, archived_to = %dest.display(), "File archived"),
        Err(e) => tracing::warn!(file = %name, error = %e, "Failed to archive file"),
    }
}
