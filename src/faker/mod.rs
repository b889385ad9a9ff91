//! Type-directed synthesis of fake values.

use serde::{Deserialize, Serialize};

pub mod directives;
pub mod generators;
pub mod scalars;
pub mod synthesizer;

pub use directives::{DirectiveSet, ListLength};
pub use generators::{FakeOptions, Generator, Locale};
pub use scalars::ScalarDefaults;
pub use synthesizer::{is_relay_mutation, Synthesizer};

/// Defaults used when a field carries no directive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakerSettings {
    pub locale: Locale,
    pub list_length: ListLength,
    pub types: ScalarDefaults,
}

#[cfg(test)]
mod directives_test;
