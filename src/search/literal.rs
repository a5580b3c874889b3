//! Literal search backend: drives ripgrep and decodes its JSON event stream.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// One literal match record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMatch {
    pub file_path: String,
    pub line_number: u64,
    pub match_text: String,
    pub absolute_offset: u64,
    pub submatches: Vec<Submatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Typed outcome of a ripgrep invocation.
///
/// ripgrep's exit codes: 0 = matches found, 1 = no matches (success, not an
/// error), anything else = real failure.
#[derive(Debug)]
pub enum LiteralOutcome {
    Matches(Vec<LiteralMatch>),
    NoMatches,
    ToolMissing,
    ToolError { code: Option<i32>, stderr: String },
}

/// Invokes ripgrep with line-delimited JSON output, one line of context, and
/// case-sensitive fixed-string matching.
#[derive(Debug, Clone)]
pub struct RipgrepSearcher {
    program: String,
}

impl RipgrepSearcher {
    pub fn new(program: String) -> Self {
        Self { program }
    }

    pub fn search(&self, project_root: &Path, pattern: &str) -> LiteralOutcome {
        let result = Command::new(&self.program)
            .args(["--json", "--line-number", "--context", "1", "--fixed-strings"])
            .arg("-e")
            .arg(pattern)
            .arg(project_root)
            .output();

        match result {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LiteralOutcome::ToolMissing,
            Err(e) => LiteralOutcome::ToolError {
                code: None,
                stderr: e.to_string(),
            },
            Ok(output) => match output.status.code() {
                Some(0) => {
                    LiteralOutcome::Matches(decode_matches(&String::from_utf8_lossy(&output.stdout)))
                }
                Some(1) => LiteralOutcome::NoMatches,
                code => LiteralOutcome::ToolError {
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                },
            },
        }
    }
}

// ripgrep's JSON event stream. Only `match` events carry results; `begin`,
// `end`, `context`, and `summary` events are skipped, as is any line that is
// not valid JSON (ripgrep may interleave diagnostics).
#[derive(Deserialize)]
struct RgEvent {
    #[serde(rename = "type")]
    kind: String,
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct RgMatchData {
    path: RgText,
    lines: RgText,
    line_number: Option<u64>,
    absolute_offset: u64,
    submatches: Vec<RgSubmatch>,
}

#[derive(Deserialize)]
struct RgText {
    // Absent when ripgrep reports raw bytes instead of text.
    text: Option<String>,
}

#[derive(Deserialize)]
struct RgSubmatch {
    #[serde(rename = "match")]
    matched: RgText,
    start: usize,
    end: usize,
}

/// Decode `match` events from ripgrep's stdout, discarding everything else.
pub(crate) fn decode_matches(stdout: &str) -> Vec<LiteralMatch> {
    let mut matches = Vec::new();

    for line in stdout.lines() {
        let event: RgEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "discarding undecodable ripgrep output line");
                continue;
            }
        };
        if event.kind != "match" {
            continue;
        }
        let data: RgMatchData = match serde_json::from_value(event.data) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "discarding malformed ripgrep match record");
                continue;
            }
        };

        matches.push(LiteralMatch {
            file_path: data.path.text.unwrap_or_default(),
            line_number: data.line_number.unwrap_or(0),
            match_text: data.lines.text.unwrap_or_default().trim().to_string(),
            absolute_offset: data.absolute_offset,
            submatches: data
                .submatches
                .into_iter()
                .map(|s| Submatch {
                    start: s.start,
                    end: s.end,
                    text: s.matched.text.unwrap_or_default(),
                })
                .collect(),
        });
    }

    matches
}
