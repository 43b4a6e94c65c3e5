//! Project naming rules.
//!
//! A unit file named `test-<project>.c` yields the project name `<project>`.
//! The project name later becomes a directory segment under the output root,
//! so it must be path-safe before anything is written.

use crate::errors::CoreError;

/// File name prefix that marks a translation unit.
pub const UNIT_PREFIX: &str = "test-";

/// File name suffix that marks a translation unit.
pub const UNIT_SUFFIX: &str = ".c";

/// Placeholder substituted by [`render_unit_dir`].
pub const PROJECT_PLACEHOLDER: &str = "{project}";

/// Derive the project name from a unit file name.
///
/// Returns `None` when `file_name` is not a `test-*.c` file.
#[must_use]
pub fn project_name_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(UNIT_PREFIX)
        .and_then(|rest| rest.strip_suffix(UNIT_SUFFIX))
}

/// Check that `name` can be used as a single output directory segment.
///
/// Accepted: non-empty, ASCII alphanumerics plus `-`, `_` and `.`, not
/// starting with `.`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidProjectName`] describing the first violation.
pub fn validate_project_name(name: &str) -> Result<(), CoreError> {
    let invalid = |reason: &str| CoreError::InvalidProjectName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('.') {
        return Err(invalid("name must not start with '.'"));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(invalid(&format!("character {bad:?} is not allowed")));
    }
    Ok(())
}

/// Render the unit output directory template for `project`.
///
/// Every `{project}` occurrence is replaced; a template without the
/// placeholder is returned unchanged (e.g. the legacy fixed `main` layout).
#[must_use]
pub fn render_unit_dir(template: &str, project: &str) -> String {
    template.replace(PROJECT_PLACEHOLDER, project)
}
