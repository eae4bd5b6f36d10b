//! gw-logging: NDJSON decision events + debug log channel.
//!
//! Decision events are append-only NDJSON, one object per line, for post-mortems of a game.
//! The debug channel is off unless `GW_DEBUG_LOG` is set to `1`, `true` or `yes`.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version stamped on every decision event.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

pub fn hash_config_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn dbg_enabled() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| {
        matches!(
            std::env::var("GW_DEBUG_LOG").as_deref(),
            Ok("1" | "true" | "yes")
        )
    })
}

/// Emit one JSON debug line on stderr (no-op unless enabled).
pub fn dbg_log(location: &str, message: &str, data: serde_json::Value) {
    if !dbg_enabled() {
        return;
    }
    let payload = serde_json::json!({
        "ts_ms": now_ms(),
        "location": location,
        "message": message,
        "data": data,
    });
    if let Ok(line) = serde_json::to_string(&payload) {
        let mut err = io::stderr().lock();
        let _ = err.write_all(line.as_bytes());
        let _ = err.write_all(b"\n");
    }
}

/// Utility of one top-level plan entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryUtilityV1 {
    pub actions: Vec<String>,
    pub outcomes: u32,
    pub raw_utility: f32,
    pub utility: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStatsV1 {
    pub expansions: u64,
    pub heuristic_evals: u64,
    pub cache_hits: u64,
    pub cache_writes: u64,
    pub pruned_reversals: u64,
    pub sampled_out: u64,
    pub empty_fallbacks: u64,
    pub pellet_search_anomalies: u64,
}

/// One `choose_move` decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoveEventV1 {
    pub event: String,
    pub v: u32,
    pub ts_ms: u64,

    pub move_index: u64,
    pub mode: String,
    pub config_hash: Option<String>,

    pub facing: String,
    pub chosen_action: String,
    pub default_used: bool,
    pub entries: Vec<EntryUtilityV1>,

    pub cache_cleared: bool,
    pub cache_entries: u64,
    pub elapsed_us: u64,
    pub stats: SearchStatsV1,
}

#[derive(Debug, Error)]
pub enum NdjsonError {
    #[error("ndjson io error: {0}")]
    Io(#[from] io::Error),
    #[error("ndjson encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}

/// Read every well-formed line of an NDJSON file, skipping blank or truncated lines.
pub fn read_events_lenient<T: for<'de> Deserialize<'de>>(
    path: impl AsRef<Path>,
) -> Result<Vec<T>, NdjsonError> {
    let s = std::fs::read_to_string(path)?;
    Ok(s.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str::<T>(l).ok())
        .collect())
}
