// ABOUTME: Output formatting for CLI feedback and inventory listings.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::diagnostics::Diagnostics;
use crate::inventory::InventoryRecord;
use crate::state::StateSnapshot;
use crate::types::short_digest;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Instant;

/// Heading for records not declared in any compose manifest.
pub const UNMANAGED_HEADING: &str = "(not in compose)";

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => println!("{message}"),
            // The snapshot itself is the JSON result.
            OutputMode::Json => {}
        }
    }

    /// Print scan warnings (normal mode only).
    pub fn warnings(&self, diagnostics: &Diagnostics) {
        if self.mode != OutputMode::Normal {
            return;
        }
        for warning in diagnostics.warnings() {
            eprintln!("warning: {}: {}", warning.path.display(), warning.message);
        }
    }

    /// Print the inventory.
    pub fn snapshot(&self, snapshot: &StateSnapshot) {
        match self.mode {
            OutputMode::Normal => print!("{}", render_snapshot(snapshot)),
            OutputMode::Quiet => {
                for record in snapshot
                    .images
                    .iter()
                    .filter(|record| record.update_available == Some(true))
                {
                    println!("{}", record.display_name);
                }
            }
            OutputMode::Json => match serde_json::to_string_pretty(snapshot) {
                Ok(json) => println!("{json}"),
                Err(e) => self.error(&e.to_string()),
            },
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.start_time.map(|_| self.elapsed_secs()),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

/// Short human description of a record's update state.
pub fn update_label(record: &InventoryRecord) -> String {
    match (record.update_available, record.update_message.as_deref()) {
        (Some(true), _) => "update available".to_string(),
        (Some(false), _) => "up to date".to_string(),
        (None, Some(message)) => format!("unknown ({message})"),
        (None, None) => "not checked".to_string(),
    }
}

/// Render records grouped by stack, undeclared containers last.
pub fn render_snapshot(snapshot: &StateSnapshot) -> String {
    let mut out = String::new();

    let refreshed = snapshot
        .last_refresh
        .map_or_else(|| "never".to_string(), |at| at.to_rfc3339());
    let pending = snapshot
        .images
        .iter()
        .filter(|record| record.update_available == Some(true))
        .count();
    let _ = writeln!(
        out,
        "{} image(s), {} with updates, last refresh {}",
        snapshot.images.len(),
        pending,
        refreshed
    );

    let mut stacks: BTreeMap<&str, Vec<&InventoryRecord>> = BTreeMap::new();
    let mut unmanaged = Vec::new();
    for record in &snapshot.images {
        match record.stack.as_deref() {
            Some(stack) => stacks.entry(stack).or_default().push(record),
            None => unmanaged.push(record),
        }
    }

    let groups = stacks
        .into_iter()
        .chain((!unmanaged.is_empty()).then_some((UNMANAGED_HEADING, unmanaged)));
    for (heading, records) in groups {
        let _ = writeln!(out, "\n{heading}");
        for record in records {
            let label = match record.service.as_deref() {
                Some(service) => format!("{service}: {}", record.display_name),
                None => record.display_name.clone(),
            };
            let _ = writeln!(
                out,
                "  {:<48} {:<8} {:<13} {}",
                label,
                record.status,
                short_digest(record.digest.as_deref()),
                update_label(record)
            );
            let _ = writeln!(out, "    {}", record.homepage_url());
        }
    }

    out
}
