//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of sprawl
//! results, including graph statistics, per-layer progress and dropped
//! documents.

use crate::output::summary::{OutputResult, SprawlSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary file
///
/// # Arguments
///
/// * `summary` - The sprawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &SprawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a sprawl summary as markdown
pub fn format_markdown_summary(summary: &SprawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Wiki-Sprawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", summary.run_id));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n", summary.config_hash));
    md.push_str(&format!(
        "- **Corpus**: {} (prefix `{}`)\n",
        summary.base_url, summary.path_prefix
    ));
    md.push_str(&format!("- **Iterations**: {}\n", summary.iterations));
    md.push_str(&format!("- **Seeds**: {}\n\n", summary.seeds.len()));
    for seed in &summary.seeds {
        md.push_str(&format!("  - {}\n", seed));
    }
    if !summary.seeds.is_empty() {
        md.push('\n');
    }

    // Graph statistics
    md.push_str("## Graph Statistics\n\n");
    md.push_str(&format!("- **Nodes**: {}\n", summary.total_nodes));
    md.push_str(&format!("- **Edges**: {}\n", summary.total_edges));
    md.push_str(&format!(
        "- **Average Out-Degree**: {:.2}\n",
        summary.average_out_degree()
    ));
    md.push_str(&format!(
        "- **Nodes Without Outgoing Links**: {}\n",
        summary.dead_ends
    ));
    md.push_str(&format!(
        "- **Failure Rate**: {:.2}%\n\n",
        summary.failure_rate()
    ));

    // Layer breakdown
    if !summary.layers.is_empty() {
        md.push_str("## Layers\n\n");
        md.push_str("| Layer | Requested | Expanded | Unreachable | Not Content | New Edges | Next Frontier |\n");
        md.push_str("|-------|-----------|----------|-------------|-------------|-----------|---------------|\n");
        for layer in &summary.layers {
            let label = if layer.closing {
                "closing".to_string()
            } else {
                layer.layer.to_string()
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                label,
                layer.requested,
                layer.expanded,
                layer.unreachable,
                layer.not_content,
                layer.edges_added,
                layer.next_frontier
            ));
        }
        md.push('\n');
    }

    // Most linked
    if !summary.top_linked.is_empty() {
        md.push_str("## Most Linked Articles\n\n");
        md.push_str("| Article | In-Links |\n");
        md.push_str("|---------|----------|\n");
        for node in &summary.top_linked {
            md.push_str(&format!(
                "| [{}]({}) | {} |\n",
                escape_text(&node.title),
                escape_link_target(&node.reference),
                node.in_degree
            ));
        }
        md.push('\n');
    }

    // Dropped documents
    if summary.total_failures() > 0 {
        md.push_str("## Dropped Documents\n\n");
        md.push_str(&format!("- **Unreachable**: {}\n", summary.unreachable));
        md.push_str(&format!("- **Not Content**: {}\n\n", summary.not_content));

        for failure in &summary.failures {
            md.push_str(&format!(
                "- {} ({}): {}\n",
                escape_text(failure.reference.as_str()),
                failure.kind,
                escape_text(&failure.message)
            ));
        }
        if summary.failures.len() as u64 != summary.total_failures() {
            md.push_str(&format!(
                "- ... and {} more\n",
                summary.total_failures().saturating_sub(summary.failures.len() as u64)
            ));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");
    md.push_str("*Generated by Wiki-Sprawl*\n");

    md
}

/// Escapes characters that would end a table cell or start markup
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '|' | '[' | ']' | '*' | '_' | '`' | '<' | '>' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' | '\r' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encodes the characters that would break `(url)` or a table cell
fn escape_link_target(url: &str) -> String {
    url.replace('|', "%7C")
        .replace('(', "%28")
        .replace(')', "%29")
        .replace(' ', "%20")
}
