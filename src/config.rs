use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the input-folder watcher.
///
/// The watcher is a client of the submission path: it turns files dropped
/// into `input_dir` into print jobs and moves them to `archive_dir` once
/// the job has been accepted.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Directory scanned for new print files
    pub input_dir: PathBuf,
    /// Directory processed files are moved into
    pub archive_dir: PathBuf,
    /// How often the input directory is scanned
    pub scan_interval_ms: u64,
    /// Grace period after a file first appears, so the writer can finish
    pub settle_delay_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("print_input"),
            archive_dir: PathBuf::from("print_archive"),
            scan_interval_ms: 1_000,
            settle_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpoolConfig {
    /// Root directory for all durable state (counter + blobs)
    pub data_dir: PathBuf,
    /// Listen address for the submission API
    pub printer_addr: SocketAddr,
    /// Listen address for the display API
    pub display_addr: SocketAddr,
    /// How long the display keeps a job on screen
    pub display_secs: u64,
    /// Display poll interval
    pub poll_interval_ms: u64,
    pub watcher: WatcherConfig,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            printer_addr: "0.0.0.0:5000"
                .parse()
                .expect("default printer address is valid"),
            display_addr: "0.0.0.0:8080"
                .parse()
                .expect("default display address is valid"),
            display_secs: 10,
            poll_interval_ms: 500,
            watcher: WatcherConfig::default(),
        }
    }
}

impl SpoolConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_printer_addr(mut self, addr: SocketAddr) -> Self {
        self.printer_addr = addr;
        self
    }

    pub fn with_display_addr(mut self, addr: SocketAddr) -> Self {
        self.display_addr = addr;
        self
    }

    pub fn with_display_secs(mut self, secs: u64) -> Self {
        self.display_secs = secs;
        self
    }

    /// File holding the last committed job identity
    pub fn counter_file(&self) -> PathBuf {
        self.data_dir.join("counter.txt")
    }

    /// Directory holding raw print content, one `<id>.txt` per job
    pub fn content_dir(&self) -> PathBuf {
        self.data_dir.join("print_content")
    }

    /// Directory holding encoded artifacts, one `<id>.png` per job
    pub fn qr_dir(&self) -> PathBuf {
        self.data_dir.join("qr_codes")
    }
}
