//! Unified error type for harness operations.
//!
//! Assertion failures are deliberately not errors: they are recorded as
//! [`AssertionResult`](crate::case::AssertionResult) data and execution
//! continues. This enum covers the operations that can themselves go wrong:
//! configuring, registering, and loading fixtures.

use serde::{Deserialize, Serialize};

/// Error raised by harness, fixture, and engine-adapter operations.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum HarnessError {
    /// Invalid configuration, or configuration changed after a test started.
    #[error("Config error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// Test registration rejected (duplicate name, wrong mode).
    #[error("Registration error: {message}")]
    Registration {
        /// Description of the rejected registration.
        message: String,
    },

    /// Fixture file could not be parsed into metadata and payload.
    #[error("Fixture error: {message}")]
    Fixture {
        /// Description of the malformed fixture.
        message: String,
    },

    /// Expectation script could not be parsed.
    #[error("Script error: {message}")]
    Script {
        /// Description of the malformed directive.
        message: String,
    },

    /// The engine under test failed to process a payload.
    #[error("Engine error: {message}")]
    Engine {
        /// Description of the engine failure.
        message: String,
    },

    /// Report serialization failed.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },
}

impl HarnessError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a registration error.
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration {
            message: message.into(),
        }
    }

    /// Create a fixture error.
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture {
            message: message.into(),
        }
    }

    /// Create a script error.
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create an engine error.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}
