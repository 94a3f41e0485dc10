mod enhanced_json;
mod enhanced_query;

pub use enhanced_json::Json;
pub use enhanced_query::Query;

/// Keeps the first three lines and at most 200 characters of a rejection
/// message.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}
