//! Indentation units.

/// A single indentation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent(&'static str);

impl Indent {
    /// Four spaces (Python).
    pub const PYTHON: Indent = Indent("    ");
    /// Two spaces.
    pub const TWO: Indent = Indent("  ");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::PYTHON
    }
}
