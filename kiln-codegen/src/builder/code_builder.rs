//! Indentation-aware code assembly.

use super::Indent;

/// Accumulates generated source with proper indentation.
///
/// # Example
///
/// ```
/// use kiln_codegen::builder::CodeBuilder;
///
/// let mut b = CodeBuilder::python();
/// b.push_line("def hello():")
///     .push_indent()
///     .push_line("return 1")
///     .push_dedent();
/// assert_eq!(b.build(), "def hello():\n    return 1\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeBuilder {
    indent_level: usize,
    indent: Indent,
    buffer: String,
}

impl CodeBuilder {
    /// Create a builder with the given indentation unit.
    pub fn new(indent: Indent) -> Self {
        Self {
            indent_level: 0,
            indent,
            buffer: String::new(),
        }
    }

    /// Create a builder with 4-space indentation.
    pub fn python() -> Self {
        Self::new(Indent::PYTHON)
    }

    /// Add a line at the current indentation.
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        if s.is_empty() {
            return self.push_blank();
        }
        self.write_indent();
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Add a multi-line block, re-indenting every non-empty line to the
    /// current level. Used to splice verbatim config-supplied method text.
    pub fn push_lines(&mut self, text: &str) -> &mut Self {
        for line in text.trim_end().lines() {
            if line.trim().is_empty() {
                self.push_blank();
            } else {
                self.write_indent();
                self.buffer.push_str(line.trim_end());
                self.buffer.push('\n');
            }
        }
        self
    }

    /// Add a blank line (never indented).
    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Add a blank line unless the buffer already ends with one.
    pub fn ensure_blank(&mut self) -> &mut Self {
        if !self.buffer.is_empty() && !self.buffer.ends_with("\n\n") {
            self.buffer.push('\n');
        }
        self
    }

    /// Add raw text without indentation or newline.
    pub fn push_raw(&mut self, s: &str) -> &mut Self {
        self.buffer.push_str(s);
        self
    }

    /// Increase indentation.
    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    /// Decrease indentation.
    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// Add a header line and run `f` one level deeper.
    pub fn push_block(&mut self, header: &str, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.push_line(header);
        self.push_indent();
        f(self);
        self.push_dedent();
        self
    }

    /// Add a triple-quoted docstring at the current indentation.
    ///
    /// Single-line text stays on one line; multi-line text gets opening and
    /// closing quotes on their own lines. Embedded triple quotes are escaped.
    pub fn push_docstring(&mut self, text: &str) -> &mut Self {
        let text = text.trim_end().replace("\"\"\"", "\\\"\\\"\\\"");
        if !text.contains('\n') {
            return self.push_line(&format!("\"\"\"{}\"\"\"", text));
        }
        self.push_line("\"\"\"");
        for line in text.lines() {
            self.push_line(line.trim_end());
        }
        self.push_line("\"\"\"");
        self
    }

    /// Current indentation level.
    pub fn current_indent(&self) -> usize {
        self.indent_level
    }

    /// View the buffer so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Consume the builder and return the generated code.
    pub fn build(self) -> String {
        self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(self.indent.as_str());
        }
    }
}
