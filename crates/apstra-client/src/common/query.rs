//! Query utilities for Apstra API
//!
//! Provides helpers for the `{"items": [...]}` list idiom, filter
//! expressions, and by-name lookups.

use crate::common::HttpClient;
use crate::error::ApstraError;
use crate::models::{ItemsResponse, TaskId};
use serde::Deserialize;

/// Render task ids as an Apstra list filter: `id in ['abc','def']`
pub fn task_list_to_filter_expr(ids: &[TaskId]) -> String {
    let quoted = ids
        .iter()
        .map(|id| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(",");
    format!("id in [{}]", quoted)
}

/// GET a list endpoint and unwrap its `items`
pub async fn query_items<T: for<'de> Deserialize<'de>>(
    http: &HttpClient,
    path: &str,
    filters: &[(&str, &str)],
) -> Result<Vec<T>, ApstraError> {
    let response: ItemsResponse<T> = http.get(path, filters).await?;
    Ok(response.items)
}

/// Pick exactly one item matching `pred`. Zero matches is `NotFound`,
/// more than one is `InvalidRequest`.
pub fn find_exactly_one<T>(
    items: Vec<T>,
    what: &str,
    wanted: &str,
    pred: impl Fn(&T) -> bool,
) -> Result<T, ApstraError> {
    let mut found = items.into_iter().filter(|i| pred(i));
    match (found.next(), found.next()) {
        (Some(item), None) => Ok(item),
        (None, _) => Err(ApstraError::NotFound(format!("{} '{}' not found", what, wanted))),
        (Some(_), Some(_)) => Err(ApstraError::InvalidRequest(format!(
            "multiple matches for {} '{}'",
            what, wanted
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_expr() {
        let ids = vec![TaskId::from("abc"), TaskId::from("def")];
        assert_eq!(task_list_to_filter_expr(&ids), "id in ['abc','def']");
    }

    #[test]
    fn test_filter_expr_single_and_empty() {
        assert_eq!(task_list_to_filter_expr(&[TaskId::from("abc")]), "id in ['abc']");
        assert_eq!(task_list_to_filter_expr(&[]), "id in []");
    }

    #[test]
    fn test_find_exactly_one() {
        let items = vec!["a", "b", "b"];
        assert_eq!(find_exactly_one(items.clone(), "tag", "a", |i| *i == "a").unwrap(), "a");

        let err = find_exactly_one(items.clone(), "tag", "c", |i| *i == "c").unwrap_err();
        assert!(err.is_not_found());

        let err = find_exactly_one(items, "tag", "b", |i| *i == "b").unwrap_err();
        assert!(matches!(err, ApstraError::InvalidRequest(_)));
    }
}
