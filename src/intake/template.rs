//! Template filler for the policy text.

use std::sync::LazyLock;

use regex::Regex;

use super::model::ExtractedData;

pub const NAME_PLACEHOLDER: &str = "{{name}}";
pub const PASSPORT_PLACEHOLDER: &str = "{{passport_number}}";
pub const VEHICLE_PLACEHOLDER: &str = "{{vehicle_number}}";

const PLACEHOLDERS: [&str; 3] = [NAME_PLACEHOLDER, PASSPORT_PLACEHOLDER, VEHICLE_PLACEHOLDER];

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*[A-Za-z_][A-Za-z0-9_]*\s*\}\}").unwrap());

/// Result of filling a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledTemplate {
    pub text: String,
    /// Known placeholders that the template does not contain.
    pub missing: Vec<&'static str>,
    /// `{{tokens}}` in the template that are not known placeholders.
    pub unresolved: Vec<String>,
}

impl FilledTemplate {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.unresolved.is_empty()
    }
}

/// Known placeholders absent from `template`.
pub fn missing_placeholders(template: &str) -> Vec<&'static str> {
    PLACEHOLDERS
        .into_iter()
        .filter(|p| !template.contains(p))
        .collect()
}

/// Replace every occurrence of the three placeholders with the record's fields.
///
/// A missing placeholder is not an error: the substitution is skipped and the
/// placeholder is reported in [`FilledTemplate::missing`].
pub fn fill(template: &str, data: &ExtractedData) -> FilledTemplate {
    let unresolved = TOKEN_RE
        .find_iter(template)
        .map(|m| m.as_str().to_string())
        .filter(|token| !PLACEHOLDERS.contains(&token.as_str()))
        .collect();

    let text = template
        .replace(NAME_PLACEHOLDER, &data.name)
        .replace(PASSPORT_PLACEHOLDER, &data.passport_number)
        .replace(VEHICLE_PLACEHOLDER, &data.vehicle_number);

    FilledTemplate {
        text,
        missing: missing_placeholders(template),
        unresolved,
    }
}
