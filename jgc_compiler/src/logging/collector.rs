//! Diagnostic collector for multi-script compiles with cargo-style output
//!
//! Groups events by script file so a console invocation over several
//! scripts can report per-file diagnostics and a closing summary.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Context information for the script currently being compiled
#[derive(Debug, Clone)]
pub struct ScriptContext {
    pub script_path: PathBuf,
    pub script_id: usize,
    pub start_time: Instant,
}

impl ScriptContext {
    pub fn new(script_path: PathBuf, script_id: usize) -> Self {
        Self {
            script_path,
            script_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Tallies over every script seen during a compile run.
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_scripts: usize,
    pub clean_scripts: usize,
    pub failed_scripts: usize,
    pub scripts_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub average_script_time: Duration,
}

/// Thread-safe store of per-script diagnostics.
///
/// Recording is capped twice: each script keeps at most
/// `MAX_LOG_EVENTS_PER_SCRIPT` events (the list is closed with a marker
/// warning), and the collector as a whole stops at `MAX_ERROR_COLLECTION`.
pub struct DiagnosticCollector {
    script_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    script_contexts: Mutex<BTreeMap<PathBuf, ScriptContext>>,
    compile_start: Instant,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self {
            script_events: Mutex::new(BTreeMap::new()),
            script_contexts: Mutex::new(BTreeMap::new()),
            compile_start: Instant::now(),
        }
    }

    /// Record an event against a script, subject to both capacity caps.
    pub fn record_event(&self, script_path: &Path, event: LogEvent) {
        let mut events = self.script_events.lock().unwrap();

        let total: usize = events.values().map(Vec::len).sum();
        if total >= MAX_ERROR_COLLECTION {
            return;
        }

        let bucket = events.entry(script_path.to_path_buf()).or_default();
        match bucket.len().cmp(&MAX_LOG_EVENTS_PER_SCRIPT) {
            Ordering::Less => bucket.push(event),
            Ordering::Equal => bucket.push(LogEvent::warning(&format!(
                "Too many events for script (limit: {})",
                MAX_LOG_EVENTS_PER_SCRIPT
            ))),
            Ordering::Greater => {}
        }
    }

    /// Remember when a script started, for the timing summary.
    pub fn record_script_context(&self, context: ScriptContext) {
        let mut contexts = self.script_contexts.lock().unwrap();
        contexts.insert(context.script_path.clone(), context);
    }

    pub fn get_script_events(&self, script_path: &Path) -> Vec<LogEvent> {
        let events = self.script_events.lock().unwrap();
        events.get(script_path).cloned().unwrap_or_default()
    }

    pub fn script_has_errors(&self, script_path: &Path) -> bool {
        let events = self.script_events.lock().unwrap();
        events
            .get(script_path)
            .is_some_and(|bucket| bucket.iter().any(|e| e.is_error()))
    }

    /// Snapshot of every script's event list, in path order.
    pub fn get_all_script_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.script_events.lock().unwrap().clone()
    }

    /// Errors whose codes abandon the script, paired with their script.
    pub fn get_halting_errors(&self) -> Vec<(PathBuf, LogEvent)> {
        let events = self.script_events.lock().unwrap();
        events
            .iter()
            .flat_map(|(path, bucket)| {
                bucket
                    .iter()
                    .filter(|e| e.is_error() && e.halts_script())
                    .map(|e| (path.clone(), e.clone()))
            })
            .collect()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.script_events.lock().unwrap();
        let contexts = self.script_contexts.lock().unwrap();

        let mut summary = ProcessingSummary {
            total_scripts: events.len(),
            total_processing_time: self.compile_start.elapsed(),
            ..Default::default()
        };

        let mut script_times = Vec::new();
        for (script_path, bucket) in events.iter() {
            let errors = bucket.iter().filter(|e| e.is_error()).count();
            let warnings = bucket.iter().filter(|e| e.is_warning()).count();
            summary.total_errors += errors;
            summary.total_warnings += warnings;

            if errors > 0 {
                summary.failed_scripts += 1;
            } else if warnings > 0 {
                summary.scripts_with_warnings += 1;
            } else {
                summary.clean_scripts += 1;
            }

            if let Some(context) = contexts.get(script_path) {
                script_times.push(context.elapsed());
            }
        }

        if !script_times.is_empty() {
            summary.average_script_time =
                script_times.iter().sum::<Duration>() / script_times.len() as u32;
        }

        summary
    }

    pub fn total_event_count(&self) -> usize {
        let events = self.script_events.lock().unwrap();
        events.values().map(Vec::len).sum()
    }

    /// Occupancy as (recorded, capacity, fill ratio).
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let recorded = self.total_event_count();
        let ratio = recorded as f64 / MAX_ERROR_COLLECTION as f64;
        (recorded, MAX_ERROR_COLLECTION, ratio)
    }
}

impl Default for DiagnosticCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Render every script's errors and warnings the way cargo reports
/// compile diagnostics, ending with run totals.
pub fn format_cargo_style_diagnostics(collector: &DiagnosticCollector) -> String {
    let mut out = String::new();

    for (script_path, events) in &collector.get_all_script_events() {
        if !events.iter().any(|e| e.is_error() || e.is_warning()) {
            continue;
        }

        let _ = writeln!(out, "Compiling {}...", script_path.display());
        for event in events.iter().filter(|e| e.is_error()) {
            render_event(&mut out, script_path, event);
        }
        for event in events.iter().filter(|e| e.is_warning()) {
            render_event(&mut out, script_path, event);
        }
        out.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        let _ = writeln!(out, "\nTotal errors: {}", summary.total_errors);
    }
    if summary.total_warnings > 0 {
        let _ = writeln!(out, "Total warnings: {}", summary.total_warnings);
    }

    out
}

/// One diagnostic in cargo style. Errors get classification and help
/// lines; warnings stay short.
fn render_event(out: &mut String, script_path: &Path, event: &LogEvent) {
    let label = if event.is_error() { "error" } else { "warning" };
    let location = event
        .span
        .as_ref()
        .map(|s| {
            format!(
                " --> {}:{}:{}",
                script_path.display(),
                s.start.line,
                s.start.column
            )
        })
        .unwrap_or_default();

    let _ = writeln!(
        out,
        "{}[{}]: {}{}",
        label,
        event.code.as_str(),
        event.message,
        location
    );

    if event.is_error() {
        let _ = writeln!(
            out,
            "  = severity: {}, category: {}",
            event.severity(),
            event.category()
        );
    }

    // The script/script_id pairs stamped by the macro layer restate what
    // the grouping header already says
    let extra: Vec<_> = event
        .context
        .iter()
        .filter(|(key, _)| key.as_str() != "script" && key.as_str() != "script_id")
        .collect();
    if !extra.is_empty() {
        if event.is_error() {
            out.push_str("  |\n");
        }
        for (key, value) in extra {
            let _ = writeln!(out, "  = {}: {}", key, value);
        }
    }

    if event.is_error() {
        let action = event.recommended_action();
        if action != "No specific action available" {
            let _ = writeln!(out, "  = help: {}", action);
        }
    }
}
