use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use qrspool::config::SpoolConfig;
use qrspool::encode::{Encoder, QrPngEncoder};
use qrspool::error::{Result, SpoolError};
use qrspool::spool::PrintSpooler;

/// Small modules keep test artifacts cheap to produce.
fn test_encoder() -> Arc<QrPngEncoder> {
    Arc::new(QrPngEncoder {
        module_size: 2,
        border: 1,
        ..Default::default()
    })
}

fn open_spooler(dir: &Path) -> PrintSpooler {
    PrintSpooler::open(&SpoolConfig::new(dir), test_encoder()).unwrap()
}

/// Encoder that always fails, for crash-injection scenarios.
struct FailingEncoder;

impl Encoder for FailingEncoder {
    fn encode(&self, _text: &str) -> Result<Vec<u8>> {
        Err(SpoolError::Encode("injected failure".to_string()))
    }
}

#[test]
fn latest_before_any_submission_reports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let spooler = open_spooler(dir.path());

    let latest = spooler.latest();
    assert!(!latest.exists);
    assert_eq!(latest.id, None);
    assert!(!latest.available);
}

#[test]
fn hello_world_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let spooler = open_spooler(dir.path());

    let first = spooler.submit("Hello").unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(first.filename, "1.png");
    assert_eq!(first.content_filename, "1.txt");

    let latest = spooler.latest();
    assert_eq!(latest.id, Some(1));
    assert!(latest.available);

    let second = spooler.submit("World").unwrap();
    assert_eq!(second.id, 2);

    let latest = spooler.latest();
    assert_eq!(latest.id, Some(2));
    assert!(latest.available);

    // Earlier jobs stay addressable
    assert_eq!(spooler.content(1).unwrap(), "Hello");
    assert_eq!(spooler.content(2).unwrap(), "World");
}

#[test]
fn content_is_stored_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let spooler = open_spooler(dir.path());

    let payload = "  line one\n\tline two with unicode ✓\n";
    let receipt = spooler.submit(payload).unwrap();
    assert_eq!(spooler.content(receipt.id).unwrap(), payload);
}

#[test]
fn artifact_is_a_png() {
    let dir = tempfile::tempdir().unwrap();
    let spooler = open_spooler(dir.path());

    let receipt = spooler.submit("Hello").unwrap();
    let artifact = spooler.artifact(receipt.id).unwrap();
    assert!(artifact.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn empty_content_is_rejected_without_spending_an_identity() {
    let dir = tempfile::tempdir().unwrap();
    let spooler = open_spooler(dir.path());

    for payload in ["", "   ", "\n\t  \n"] {
        assert!(matches!(
            spooler.submit(payload),
            Err(SpoolError::EmptyContent)
        ));
    }

    assert!(!spooler.latest().exists);
    let receipt = spooler.submit("real job").unwrap();
    assert_eq!(receipt.id, 1, "rejected submissions must not advance the counter");
}

#[test]
fn unknown_ids_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let spooler = open_spooler(dir.path());

    assert!(matches!(spooler.content(42), Err(SpoolError::JobNotFound(42))));
    assert!(matches!(spooler.artifact(42), Err(SpoolError::JobNotFound(42))));
    assert!(!spooler.exists(42));
}

#[test]
fn failed_encode_leaves_id_reserved_but_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = SpoolConfig::new(dir.path());

    {
        let spooler = PrintSpooler::open(&config, Arc::new(FailingEncoder)).unwrap();
        assert!(matches!(spooler.submit("doomed"), Err(SpoolError::Encode(_))));

        // The identity was reserved and is reported, but never as available
        assert!(!spooler.exists(1));
        let latest = spooler.latest();
        assert!(latest.exists);
        assert_eq!(latest.id, Some(1));
        assert!(!latest.available);
    }

    // The failed identity is permanently skipped, never reused
    let spooler = PrintSpooler::open(&config, test_encoder()).unwrap();
    let receipt = spooler.submit("survivor").unwrap();
    assert_eq!(receipt.id, 2);
    assert!(spooler.latest().available);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_submissions_get_distinct_identities() {
    let dir = tempfile::tempdir().unwrap();
    let spooler = Arc::new(open_spooler(dir.path()));

    const JOBS: usize = 20;

    let handles: Vec<_> = (0..JOBS)
        .map(|n| {
            let spooler = spooler.clone();
            tokio::task::spawn_blocking(move || spooler.submit(&format!("job {n}")).unwrap().id)
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }

    let distinct: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), JOBS);
    assert_eq!(ids.iter().copied().max(), Some(JOBS as u64));

    let latest = spooler.latest();
    assert_eq!(latest.id, Some(JOBS as u64));
    assert!(latest.available);
}
