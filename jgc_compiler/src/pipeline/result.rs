use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::grammar::ParseTree;
use crate::lexical::ScanMetrics;

/// How one compile unit entered the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CompileRoute {
    /// A console line compiled in place
    Command,
    /// A `/compile <pathname>` directive
    CompileScript { path: String },
    /// A bare script pathname typed at the console
    ScriptReference { path: String },
    /// Script source handed to the library directly
    Source,
}

impl CompileRoute {
    pub fn describe(&self) -> String {
        match self {
            CompileRoute::Command => "command line".to_string(),
            CompileRoute::CompileScript { path } => format!("compile directive for {}", path),
            CompileRoute::ScriptReference { path } => format!("script reference {}", path),
            CompileRoute::Source => "inline script source".to_string(),
        }
    }
}

/// Counters and timing collected across one compile unit
#[derive(Debug, Clone, Serialize)]
pub struct CompileStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: f64,
    pub source_bytes: usize,
    pub token_count: usize,
    pub rescued_lexemes: usize,
    pub block_count: usize,
    pub statement_count: usize,
    pub node_count: usize,
}

impl CompileStats {
    /// Open the timing window for a new compile unit.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            duration_ms: 0.0,
            source_bytes: 0,
            token_count: 0,
            rescued_lexemes: 0,
            block_count: 0,
            statement_count: 0,
            node_count: 0,
        }
    }

    /// Fold one scan's metrics into the unit totals. Statement excerpts
    /// are scanned separately, so a script accumulates several scans.
    pub fn record_scan(&mut self, metrics: &ScanMetrics) {
        self.token_count += metrics.total_tokens;
        self.rescued_lexemes += metrics.rescued_lexemes;
    }

    /// Close the timing window.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at)
            .num_microseconds()
            .map(|us| us as f64 / 1000.0)
            .unwrap_or(f64::MAX);
    }

    pub fn tokens_per_second(&self) -> f64 {
        if self.duration_ms > 0.0 {
            self.token_count as f64 / (self.duration_ms / 1000.0)
        } else {
            0.0
        }
    }
}

/// Complete result of one compile unit: the route it took, the parse
/// tree it produced, and the stats gathered along the way
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutput {
    pub route: CompileRoute,
    pub tree: ParseTree,
    pub stats: CompileStats,
}

impl CompileOutput {
    pub fn new(route: CompileRoute, tree: ParseTree, stats: CompileStats) -> Self {
        Self { route, tree, stats }
    }

    /// Render the full report as pretty JSON for the console's `--json`
    /// flag.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            "Compile unit completed",
            "route" => self.route.describe(),
            "duration_ms" => format!("{:.2}", self.stats.duration_ms),
            "tokens" => self.stats.token_count,
            "statements" => self.stats.statement_count,
            "nodes" => self.stats.node_count,
            "processing_rate_tokens_per_sec" => format!("{:.0}", self.stats.tokens_per_second())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_accumulate_across_scans() {
        let mut stats = CompileStats::begin();
        let first = ScanMetrics {
            total_tokens: 7,
            rescued_lexemes: 1,
            ..Default::default()
        };
        let second = ScanMetrics {
            total_tokens: 3,
            ..Default::default()
        };

        stats.record_scan(&first);
        stats.record_scan(&second);
        stats.finish();

        assert_eq!(stats.token_count, 10);
        assert_eq!(stats.rescued_lexemes, 1);
        assert!(stats.duration_ms >= 0.0);
        assert!(stats.finished_at >= stats.started_at);
    }

    #[test]
    fn output_serializes_with_route_and_tree() {
        let (tree, _root) = ParseTree::with_script_root();
        let output = CompileOutput::new(
            CompileRoute::CompileScript {
                path: "basin.jgs".to_string(),
            },
            tree,
            CompileStats::begin(),
        );

        let json = output.to_json_pretty().unwrap();
        assert!(json.contains("basin.jgs"));
        assert!(json.contains("\"tree\""));
        assert!(json.contains("\"stats\""));
    }

    #[test]
    fn route_descriptions_name_their_source() {
        assert_eq!(CompileRoute::Command.describe(), "command line");
        assert!(CompileRoute::ScriptReference {
            path: "run/basin.jgs".to_string(),
        }
        .describe()
        .contains("run/basin.jgs"));
    }
}
