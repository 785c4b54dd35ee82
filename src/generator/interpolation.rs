//! Placeholder substitution for generated files.
//!
//! Template files and file names may contain `{{ variable }}` placeholders.
//! Whitespace inside the braces is ignored. Placeholders naming an unknown
//! variable are left exactly as written, so templates that ship their own
//! `{{ }}` syntax (Vue, Handlebars) survive generation.
//!
//! # Example
//!
//! ```
//! use sprout::generator::{render, TemplateContext};
//!
//! let ctx = TemplateContext::new("my-app");
//! assert_eq!(render("name: {{ project_name }}", &ctx), "name: my-app");
//! assert_eq!(render("{{ unknown }}", &ctx), "{{ unknown }}");
//! ```

use std::collections::HashMap;

/// A segment of a template string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Placeholder: `{{ name }}`, with the original text for round-tripping
    Variable { name: String, raw: String },
}

/// Split `input` into literal text and `{{ name }}` placeholders.
///
/// An opening `{{` without a closing `}}` is treated as literal text.
pub fn parse_placeholders(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = input;
    let mut literal = String::new();

    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };

        let name = after_open[..end].trim();
        literal.push_str(&rest[..start]);

        if is_identifier(name) {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Variable {
                name: name.to_string(),
                raw: rest[start..start + 2 + end + 2].to_string(),
            });
        } else {
            literal.push_str(&rest[start..start + 2 + end + 2]);
        }

        rest = &after_open[end + 2..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Check if a string contains any placeholder.
pub fn has_placeholders(input: &str) -> bool {
    parse_placeholders(input)
        .iter()
        .any(|seg| matches!(seg, Segment::Variable { .. }))
}

/// Variables available to templates.
///
/// Always carries `project_name` and `sprout_version`.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a context for a project named `project_name`.
    pub fn new(project_name: &str) -> Self {
        let mut vars = HashMap::new();
        vars.insert("project_name".to_string(), project_name.to_string());
        vars.insert(
            "sprout_version".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self { vars }
    }

    /// Add or replace a variable.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Substitute every known placeholder in `input`.
pub fn render(input: &str, context: &TemplateContext) -> String {
    let mut result = String::with_capacity(input.len());

    for segment in parse_placeholders(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable { name, raw } => match context.get(&name) {
                Some(value) => result.push_str(value),
                None => result.push_str(&raw),
            },
        }
    }

    result
}
