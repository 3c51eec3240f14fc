//! Device transport: open failures, line decoding, end of input, read-ahead bound, reopen.

mod common;

use common::{AlphaScorer, RecordingPresenter};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use stroke_monitor::{
    config::MonitorConfig,
    ingest::{IngestionLoop, TickOutcome},
    storage::MemorySink,
    transport::{LineReaderTransport, Transport},
    MonitorError, Verdict,
};

const WAIT: Duration = Duration::from_secs(5);

fn device(dir: &Path, bytes: &[u8]) -> String {
    let path = dir.join("device.txt");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(bytes).unwrap();
    path.to_string_lossy().into_owned()
}

/// Next line from the reader thread, or None once the source is exhausted.
fn next_line(t: &mut LineReaderTransport) -> Option<String> {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if t.bytes_available() {
            return t.read_line().unwrap();
        }
        if t.is_exhausted() {
            return None;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    panic!("reader produced nothing within {WAIT:?}");
}

fn read_all(t: &mut LineReaderTransport) -> Vec<String> {
    std::iter::from_fn(|| next_line(t)).collect()
}

#[test]
fn missing_device_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-device");
    let mut t = LineReaderTransport::new(path.to_string_lossy());
    let err = t.open().unwrap_err();
    assert!(matches!(err, MonitorError::TransportUnavailable(ref m) if m.contains("no-such-device")));
    assert!(!t.bytes_available());
    assert!(!t.is_exhausted());
}

#[test]
fn read_before_open_is_an_error() {
    let mut t = LineReaderTransport::new("whatever");
    assert!(matches!(t.read_line(), Err(MonitorError::TransportUnavailable(_))));
}

#[test]
fn lines_are_trimmed_and_decoded_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let dev = device(dir.path(), b"0.5,0.7,0.2,0.6\r\n  1,2,3,4  \n0.5,\xff\xfe,0.2,0.6\n\nlast");
    let mut t = LineReaderTransport::new(dev);
    t.open().unwrap();

    let lines = read_all(&mut t);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "0.5,0.7,0.2,0.6");
    assert_eq!(lines[1], "1,2,3,4");
    assert!(lines[2].contains('\u{FFFD}'));
    assert!(lines[2].starts_with("0.5,") && lines[2].ends_with(",0.2,0.6"));
    assert_eq!(lines[3], "");
    // final line without a newline still arrives
    assert_eq!(lines[4], "last");
}

#[test]
fn exhausted_only_after_every_line_is_consumed() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = LineReaderTransport::new(device(dir.path(), b"1,2,3,4\n5,6,7,8\n"));
    t.open().unwrap();

    assert_eq!(next_line(&mut t).as_deref(), Some("1,2,3,4"));
    assert!(!t.is_exhausted());
    assert_eq!(next_line(&mut t).as_deref(), Some("5,6,7,8"));
    assert_eq!(next_line(&mut t), None);
    assert!(t.is_exhausted());
    // exhausted transport stays readable and just yields nothing
    assert_eq!(t.read_line().unwrap(), None);
}

#[test]
fn read_ahead_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let total = 10_000;
    let text: String = (0..total).map(|i| format!("{i},0.7,0.2,0.6\n")).collect();
    let mut t = LineReaderTransport::new(device(dir.path(), text.as_bytes())).with_buffer_lines(8);
    t.open().unwrap();

    // give the reader thread time to run as far ahead as it can
    std::thread::sleep(Duration::from_millis(200));
    assert!(t.buffered() <= 8, "buffered {}", t.buffered());
    assert!(!t.is_exhausted());

    // a slow consumer still sees every line, in order
    let lines = read_all(&mut t);
    assert_eq!(lines.len(), total);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line, &format!("{i},0.7,0.2,0.6"));
    }
    assert_eq!(t.buffered(), 0);
}

#[test]
fn buffer_bound_is_at_least_one() {
    let t = LineReaderTransport::new("-").with_buffer_lines(0);
    assert_eq!(t.buffer_lines(), 1);
}

#[test]
fn open_while_reading_keeps_position() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = LineReaderTransport::new(device(dir.path(), b"a\nb\nc\n"));
    t.open().unwrap();
    assert_eq!(next_line(&mut t).as_deref(), Some("a"));

    // a second open on a live reader is a no-op, not a rewind
    t.open().unwrap();
    assert_eq!(read_all(&mut t), vec!["b", "c"]);
}

#[test]
fn open_after_end_of_input_reads_device_again() {
    let dir = tempfile::tempdir().unwrap();
    let dev = device(dir.path(), b"a\n");
    let mut t = LineReaderTransport::new(dev.clone());
    t.open().unwrap();
    assert_eq!(read_all(&mut t), vec!["a"]);
    assert!(t.is_exhausted());

    std::fs::OpenOptions::new()
        .append(true)
        .open(&dev)
        .unwrap()
        .write_all(b"b\n")
        .unwrap();
    t.open().unwrap();
    assert!(!t.is_exhausted());
    assert_eq!(read_all(&mut t), vec!["a", "b"]);
}

type DeviceLoop = IngestionLoop<LineReaderTransport, AlphaScorer, MemorySink, RecordingPresenter>;

/// Tick until the reader thread has handed over a line or reached end of input.
fn tick_until_accepted(lp: &mut DeviceLoop) -> TickOutcome {
    let deadline = Instant::now() + WAIT;
    loop {
        match lp.tick() {
            TickOutcome::NoData if !lp.transport().is_exhausted() && Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(1))
            }
            other => return other,
        }
    }
}

#[test]
fn ingestion_over_device_survives_stop_and_start() {
    let dir = tempfile::tempdir().unwrap();
    let text: String = (0..15).map(|_| "85,0.7,0.2,0.6\n").collect();
    let transport = LineReaderTransport::new(device(dir.path(), text.as_bytes()));
    let config = MonitorConfig::default();
    let mut lp: DeviceLoop = IngestionLoop::new(
        &config,
        transport,
        AlphaScorer,
        MemorySink::default(),
        RecordingPresenter::default(),
    );

    lp.start().unwrap();
    for _ in 0..4 {
        assert!(matches!(tick_until_accepted(&mut lp), TickOutcome::Accepted { .. }));
    }
    assert!(lp.stop());
    // the reader is still live, so start resumes where it left off
    assert!(lp.start().unwrap());
    let mut outcomes = Vec::new();
    for _ in 0..11 {
        outcomes.push(tick_until_accepted(&mut lp));
    }

    assert!(matches!(outcomes[9], TickOutcome::Verdict(ref v) if v.verdict == Verdict::AtRisk));
    assert_eq!(outcomes[10], TickOutcome::Accepted { window_len: 1 });
    assert_eq!(lp.stats().accepted, 15);
    assert_eq!(lp.sink().records.len(), 15);
    assert_eq!(tick_until_accepted(&mut lp), TickOutcome::NoData);
    assert!(lp.transport().is_exhausted());
}
