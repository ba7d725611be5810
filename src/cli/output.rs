//! CLI output formatting

use crate::core::RunStats;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format run counters as a single line
pub fn format_stats(stats: &RunStats) -> String {
    let mut line = format!(
        "{} seed(s), {} step call(s), {} fan-out(s), {} dropped, {} output(s)",
        stats.seeds, stats.step_invocations, stats.fan_outs, stats.dropped_lineages, stats.outputs
    );
    if stats.failures > 0 || stats.panics > 0 {
        line.push_str(&format!(
            ", {}",
            style(format!("{} failure(s), {} panic(s)", stats.failures, stats.panics)).red()
        ));
    }
    line
}

/// Format a list of results, truncating long lists
pub fn format_results<T: std::fmt::Display>(results: &[T], max_items: usize) -> String {
    if results.len() <= max_items {
        let items: Vec<String> = results.iter().map(|r| r.to_string()).collect();
        return format!("[{}]", items.join(", "));
    }

    let head: Vec<String> = results.iter().take(max_items).map(|r| r.to_string()).collect();
    format!(
        "[{}, ... ({} more)]",
        head.join(", "),
        results.len() - max_items
    )
}
