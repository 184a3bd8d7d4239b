//! Fixture files: an expectation script paired with a raw payload.
//!
//! A fixture is a human-authored text file with two sections separated by a
//! `===` marker line:
//!
//! ```text
//! # Two cues with explicit settings
//! # https://example.org/captions-spec/#cue-settings
//!
//! assert_equals(cues.length, 2)
//! assert_equals(cues[0].align, "start")
//! assert_equals(cues[1].position, 100)
//!
//! ===
//!
//! CAPTIONS
//!
//! 00:00.000 --> 00:01.000 align:start
//! first cue
//!
//! 00:01.000 --> 00:02.000 position:100%
//! second cue
//! ```
//!
//! The metadata section holds a title comment, spec-link comments, and the
//! directives; the payload is handed verbatim to the engine under test.

pub mod script;

use std::path::Path;

use conforma_core::{HarnessError, TestStatus};

use crate::engine::EngineAdapter;
use crate::harness::{Harness, TestHandle};

pub use script::{parse_directive, Bindings, Directive, Literal, PathSegment, ValuePath};

/// Marker line separating metadata from payload.
pub const SECTION_MARKER: &str = "===";

/// Fallback title for fixtures without a title comment.
pub const UNTITLED_FIXTURE: &str = "fixture";

/// A parsed fixture: expectation script plus raw payload.
#[derive(Debug, Clone)]
pub struct Fixture {
    /// First non-link comment of the metadata section.
    pub title: String,
    /// Comment lines that carry specification URLs.
    pub spec_links: Vec<String>,
    /// Expectation directives, in file order.
    pub directives: Vec<Directive>,
    /// Payload bytes, preserved exactly.
    pub payload: Vec<u8>,
}

impl Fixture {
    /// Parse a fixture from text.
    ///
    /// Fails when the section marker is missing or a directive line is
    /// malformed; run-time concerns (whether paths resolve) are left to
    /// execution.
    pub fn parse(input: &str) -> Result<Self, HarnessError> {
        let mut offset = 0usize;
        let mut marker_end = None;
        for line in input.split_inclusive('\n') {
            if line.trim_end_matches(['\n', '\r']).trim() == SECTION_MARKER {
                marker_end = Some(offset + line.len());
                break;
            }
            offset += line.len();
        }
        let marker_end = marker_end
            .ok_or_else(|| HarnessError::fixture("missing '===' section marker"))?;

        let metadata = &input[..offset];
        let mut payload = &input[marker_end..];
        // One blank line after the marker belongs to the delimiter, not the
        // payload.
        if let Some(rest) = payload.strip_prefix("\r\n") {
            payload = rest;
        } else if let Some(rest) = payload.strip_prefix('\n') {
            payload = rest;
        }

        let mut title = None;
        let mut spec_links = Vec::new();
        let mut directives = Vec::new();
        for line in metadata.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                let comment = comment.trim();
                if comment.starts_with("http://") || comment.starts_with("https://") {
                    spec_links.push(comment.to_string());
                } else if title.is_none() && !comment.is_empty() {
                    title = Some(comment.to_string());
                }
                continue;
            }
            directives.push(parse_directive(line)?);
        }

        Ok(Self {
            title: title.unwrap_or_else(|| UNTITLED_FIXTURE.to_string()),
            spec_links,
            directives,
            payload: payload.as_bytes().to_vec(),
        })
    }

    /// Load and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| HarnessError::fixture(format!("{}: {e}", path.display())))?;
        Self::parse(&text)
    }

    /// Execute every directive as an assertion on `handle`, in file order.
    ///
    /// Returns whether all of them passed; a failing directive never stops
    /// the rest from running.
    pub fn execute(&self, handle: &TestHandle, bindings: &Bindings) -> bool {
        let mut all_passed = true;
        for directive in &self.directives {
            all_passed &= directive.execute(handle, bindings);
        }
        all_passed
    }
}

impl Harness {
    /// Register and run one test case from a fixture.
    ///
    /// The engine processes the payload first; its result is bound to
    /// `binding` and every directive then runs as an assertion. The case is
    /// named by the fixture title. An engine failure is an error (nothing
    /// gets registered), matching the driver contract that the engine runs
    /// before the expectation script.
    pub fn run_fixture(
        &self,
        fixture: &Fixture,
        engine: &dyn EngineAdapter,
        binding: &str,
    ) -> Result<TestStatus, HarnessError> {
        let value = engine.process(&fixture.payload)?;
        let mut bindings = Bindings::new();
        bindings.bind(binding, value);
        self.test(&fixture.title, |handle| {
            fixture.execute(handle, &bindings);
        })
    }
}
