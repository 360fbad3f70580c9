// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

// Telemetry helpers for JSONL progress logging when the `telemetry` feature
// is enabled. Manually formats JSON to avoid a non-deterministic serde_json
// dependency.

use crate::explorer::StopReason;

fn ts_micros() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros()
}

/// Emits a periodic exploration progress event.
///
/// Logs world/edge/frontier counts as a JSON line to stdout. Best-effort:
/// I/O errors are ignored and timestamps fall back to 0 on clock errors.
pub(crate) fn progress(worlds: usize, edges: usize, frontier: usize) {
    use std::io::Write as _;
    let mut out = std::io::stdout().lock();
    let _ = write!(
        out,
        r#"{{"timestamp_micros":{},"event":"progress","worlds":{worlds},"edges":{edges},"frontier":{frontier}}}"#,
        ts_micros(),
    );
    let _ = out.write_all(b"\n");
}

/// Emits the final exploration summary event.
///
/// Logs the stop reason and final counts as a JSON line to stdout.
/// Best-effort: I/O errors are ignored.
pub(crate) fn finished(stop: StopReason, worlds: usize, edges: usize, violations: usize) {
    use std::io::Write as _;
    let mut out = std::io::stdout().lock();
    let _ = write!(
        out,
        r#"{{"timestamp_micros":{},"event":"finished","stop":"{stop:?}","worlds":{worlds},"edges":{edges},"violations":{violations}}}"#,
        ts_micros(),
    );
    let _ = out.write_all(b"\n");
}
