//! Paginated list envelopes

use serde::{Deserialize, Serialize};

/// One page of a list endpoint.
///
/// `next`, when present, is a fully qualified URL that can be fetched as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Body of a list endpoint: either a paginated envelope or a bare array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// A complete, non-paginated result set.
    All(Vec<T>),
    Page(Page<T>),
}

impl<T> Listing<T> {
    /// Split into this page's items and the link to the following page.
    ///
    /// A bare array never has a following page, and an empty `next` is
    /// treated like a missing one.
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        match self {
            Self::All(items) => (items, None),
            Self::Page(page) => (page.results, page.next.filter(|next| !next.is_empty())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_is_a_complete_listing() {
        let listing: Listing<u32> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(listing.into_parts(), (vec![1, 2, 3], None));
    }

    #[test]
    fn envelope_exposes_next_link() {
        let listing: Listing<u32> = serde_json::from_str(
            r#"{"count": 5, "next": "http://catalog/v1/products/?page=2", "previous": null, "results": [1, 2]}"#,
        )
        .unwrap();

        let (items, next) = listing.into_parts();
        assert_eq!(items, vec![1, 2]);
        assert_eq!(next.as_deref(), Some("http://catalog/v1/products/?page=2"));
    }

    #[test]
    fn empty_next_ends_the_chain() {
        let listing: Listing<u32> =
            serde_json::from_str(r#"{"count": 1, "next": "", "results": [7]}"#).unwrap();
        assert_eq!(listing.into_parts(), (vec![7], None));
    }

    #[test]
    fn object_without_results_is_rejected() {
        assert!(serde_json::from_str::<Listing<u32>>("{}").is_err());
    }
}
