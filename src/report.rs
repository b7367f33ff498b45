//! Report rendering
//!
//! Turns structured stage results into the human-readable text the harness
//! prints. Stored results are never truncated; truncation happens here, at
//! display time only. Overall success is derived solely from the protocol
//! suite; discovery and orchestrator outcomes are informational.

use crate::discovery::{ProbeOutcome, ProbeResult};
use crate::responses::{ObservedEvent, PromptOutcome};
use crate::suite::{CaseOutcome, Report};
use std::fmt::Write;

/// Display limit for discovery probe bodies.
pub const PROBE_PREVIEW_LIMIT: usize = 300;

/// Display limit for suite responses and orchestrator payloads.
pub const RESPONSE_PREVIEW_LIMIT: usize = 500;

const RULE: &str = "============================================================";
const SUBRULE: &str = "----------------------------------------";

/// Truncate `text` to at most `max` characters for display, marking the cut.
///
/// Counts characters, not bytes, so multi-byte content is never split
/// mid-codepoint.
pub fn truncate_for_display(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}... (truncated)", cut)
}

/// Render discovery probe results. Informational only.
pub fn render_probes(results: &[ProbeResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "DISCOVERY ENDPOINTS");
    let _ = writeln!(out, "{}", RULE);

    for result in results {
        let _ = writeln!(out, "\n[GET {}]", result.path);
        match &result.outcome {
            ProbeOutcome::Found(body) => {
                let pretty =
                    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
                let _ = writeln!(
                    out,
                    "FOUND:\n{}",
                    truncate_for_display(&pretty, PROBE_PREVIEW_LIMIT)
                );
            }
            ProbeOutcome::NotFound(status) => {
                let _ = writeln!(out, "HTTP {} (endpoint not published)", status);
            }
            ProbeOutcome::Error(reason) => {
                let _ = writeln!(
                    out,
                    "ERROR: {}",
                    truncate_for_display(reason, PROBE_PREVIEW_LIMIT)
                );
            }
        }
    }

    out
}

/// Render the protocol suite report and return the overall success flag.
pub fn render_suite(report: &Report) -> (String, bool) {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "PROTOCOL TEST SUITE");
    let _ = writeln!(
        out,
        "started {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "{}", RULE);

    // Every case is rendered, even after a failure
    for result in &report.results {
        let _ = writeln!(out, "\n[{}]", result.case_name);
        let _ = writeln!(out, "{}", SUBRULE);

        match &result.outcome {
            CaseOutcome::Pass => {
                let _ = writeln!(out, "PASS");
                if let Some(raw) = &result.raw_response {
                    let pretty =
                        serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
                    let _ = writeln!(
                        out,
                        "{}",
                        truncate_for_display(&pretty, RESPONSE_PREVIEW_LIMIT)
                    );
                }
            }
            CaseOutcome::Fail(reason) => {
                let _ = writeln!(
                    out,
                    "FAIL: {}",
                    truncate_for_display(reason, RESPONSE_PREVIEW_LIMIT)
                );
            }
        }
    }

    let all_passed = report.all_passed();
    let passed = report
        .results
        .iter()
        .filter(|r| r.outcome.is_pass())
        .count();
    let _ = writeln!(
        out,
        "\n{}/{} cases passed{}",
        passed,
        report.results.len(),
        if all_passed { "" } else { " (failures above)" }
    );

    (out, all_passed)
}

/// Render one orchestrated prompt's outcome.
pub fn render_prompt_outcome(index: usize, outcome: &PromptOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n[Prompt {}] {}", index, outcome.prompt);
    let _ = writeln!(out, "{}", SUBRULE);
    if let Some(status) = &outcome.status {
        let _ = writeln!(out, "Status: {}", status);
    }

    for event in &outcome.events {
        match event {
            ObservedEvent::ToolCall { name, arguments } => {
                let _ = writeln!(out, "MCP Tool Called: {}", name);
                let args = serde_json::to_string_pretty(arguments)
                    .unwrap_or_else(|_| arguments.to_string());
                let _ = writeln!(out, "Arguments: {}", args);
            }
            ObservedEvent::ToolOutput(output) => {
                let _ = writeln!(
                    out,
                    "MCP Output: {}",
                    truncate_for_display(output, RESPONSE_PREVIEW_LIMIT)
                );
            }
            ObservedEvent::AssistantMessage(text) => {
                let _ = writeln!(
                    out,
                    "Response: {}",
                    truncate_for_display(text, RESPONSE_PREVIEW_LIMIT)
                );
            }
        }
    }

    if outcome.events.is_empty() {
        let _ = writeln!(out, "(no tool activity observed)");
    }

    out
}
