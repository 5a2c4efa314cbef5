use super::public::ApiError;

/// Returns the trimmed value or a 400 with `msg` when it's missing or
/// blank.
pub fn required(value: Option<String>, msg: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ApiError::bad_request(msg)),
    }
}

/// Drops blank optional values.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Slice out a 1-indexed page. Without a limit everything is returned.
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> Vec<T> {
    let Some(limit) = limit else {
        return items;
    };
    let page = page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(limit);
    items.into_iter().skip(offset).take(limit).collect()
}
