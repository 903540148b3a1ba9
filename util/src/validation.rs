use validator::ValidationErrors;

/// Joins every field message into one `; `-separated line. Falls back to the
/// error's own rendering when no custom messages were attached.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect();

    if messages.is_empty() {
        errors.to_string()
    } else {
        messages.join("; ")
    }
}
