//! Fixture text builders and engine doubles.

use conforma_core::HarnessError;
use conforma_harness::EngineAdapter;
use serde_json::Value;

/// Builder for fixture file text.
///
/// Produces the two-section shape the loader expects: comments and
/// directives, a `===` marker, then the payload.
#[derive(Debug, Clone, Default)]
pub struct FixtureBuilder {
    title: Option<String>,
    spec_links: Vec<String>,
    directives: Vec<String>,
    payload: String,
}

impl FixtureBuilder {
    /// Start an empty fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title comment.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a spec-link comment.
    pub fn spec_link(mut self, url: impl Into<String>) -> Self {
        self.spec_links.push(url.into());
        self
    }

    /// Add a directive line (as source text).
    pub fn directive(mut self, line: impl Into<String>) -> Self {
        self.directives.push(line.into());
        self
    }

    /// Set the payload text.
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Render the fixture file text.
    pub fn build(self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("# {title}\n"));
        }
        for link in &self.spec_links {
            out.push_str(&format!("# {link}\n"));
        }
        out.push('\n');
        for directive in &self.directives {
            out.push_str(directive);
            out.push('\n');
        }
        out.push_str("\n===\n\n");
        out.push_str(&self.payload);
        out
    }
}

/// Caption fixture with two cues, matching the engine value from
/// [`two_cue_engine_value`].
pub fn two_cue_caption_fixture() -> String {
    FixtureBuilder::new()
        .title("Two cues with explicit settings")
        .spec_link("https://example.org/captions-spec/#cue-settings")
        .directive("assert_equals(cues.length, 2)")
        .directive("assert_equals(cues[0].align, \"start\")")
        .directive("assert_equals(cues[1].position, 100)")
        .payload(
            "CAPTIONS\n\n00:00.000 --> 00:01.000 align:start\nfirst cue\n\n00:01.000 --> 00:02.000 position:100%\nsecond cue\n",
        )
        .build()
}

/// The observable result a conforming caption engine would produce for
/// [`two_cue_caption_fixture`]'s payload.
pub fn two_cue_engine_value() -> Value {
    serde_json::json!([
        {"align": "start", "text": "first cue"},
        {"align": "center", "position": 100, "text": "second cue"},
    ])
}

/// Engine double that returns a fixed value for every payload.
#[derive(Debug, Clone)]
pub struct StaticEngine {
    value: Value,
}

impl StaticEngine {
    /// Create an engine that always yields `value`.
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl EngineAdapter for StaticEngine {
    fn process(&self, _payload: &[u8]) -> Result<Value, HarnessError> {
        Ok(self.value.clone())
    }
}

/// Engine double that always fails, for exercising the engine-error path.
#[derive(Debug, Clone, Default)]
pub struct FailingEngine;

impl EngineAdapter for FailingEngine {
    fn process(&self, _payload: &[u8]) -> Result<Value, HarnessError> {
        Err(HarnessError::engine("engine under test crashed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conforma_harness::Fixture;

    #[test]
    fn built_fixture_parses_back() {
        let text = two_cue_caption_fixture();
        let fixture = Fixture::parse(&text).expect("parse");
        assert_eq!(fixture.title, "Two cues with explicit settings");
        assert_eq!(fixture.directives.len(), 3);
        let payload = String::from_utf8(fixture.payload).expect("utf8");
        assert!(payload.starts_with("CAPTIONS\n"));
    }
}
