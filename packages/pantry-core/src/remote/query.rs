//! PostgREST query-string builders.
//!
//! Values are double-quoted. Identities are validated before they reach
//! here, so they never contain a quote, comma, parenthesis or backslash.

use crate::friends::FriendshipStatus;

/// Profile columns embedded on both sides of an edge
pub const PROFILE_COLUMNS: &str = "id,username,name,email";

/// Edge columns
pub const EDGE_COLUMNS: &str = "id,requester_id,addressee_id,status,created_at";

/// `select=` value for an edge with both profiles embedded
pub fn edge_select() -> String {
    format!(
        "{edge},requester:profiles!requester_id({p}),addressee:profiles!addressee_id({p})",
        edge = EDGE_COLUMNS,
        p = PROFILE_COLUMNS
    )
}

/// `"value"`
pub fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}

/// `eq."value"`
pub fn eq(value: &str) -> String {
    format!("eq.{}", quoted(value))
}

/// `status=eq.<status>` filter pair
pub fn status_is(status: FriendshipStatus) -> (String, String) {
    ("status".to_string(), format!("eq.{}", status.as_str()))
}

/// `or=(requester_id.eq."id",addressee_id.eq."id")`
pub fn either_side(id: &str) -> (String, String) {
    (
        "or".to_string(),
        format!("(requester_id.{},addressee_id.{})", eq(id), eq(id)),
    )
}

/// `<column>=in.("a","b")`
pub fn in_list(column: &str, ids: &[String]) -> (String, String) {
    let values: Vec<String> = ids.iter().map(|id| quoted(id)).collect();
    (column.to_string(), format!("in.({})", values.join(",")))
}

/// Query for accepted edges touching `subject`, newest first
pub fn accepted_edges_for(subject: &str) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), edge_select()),
        status_is(FriendshipStatus::Accepted),
        either_side(subject),
        ("order".to_string(), "created_at.desc".to_string()),
    ]
}

/// Query for accepted edges with `column` in `ids`
pub fn accepted_edges_with_any(column: &str, ids: &[String]) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), edge_select()),
        status_is(FriendshipStatus::Accepted),
        in_list(column, ids),
    ]
}
