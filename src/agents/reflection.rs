//! Pass-through validation of a hypothesis.

use crate::source::Hypothesis;

/// Confirms the hypothesis without touching its score.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reflector;

impl Reflector {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, hypothesis: &Hypothesis) -> String {
        format!("Confirmed: {} ({})", hypothesis.idea, hypothesis.info)
    }
}
