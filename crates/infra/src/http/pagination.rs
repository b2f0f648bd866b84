//! Pagination Aggregator
//!
//! Follows the `next` chain of a paginated listing and concatenates the
//! `results` of every page in arrival order. A bare JSON array is a complete,
//! unpaginated listing and ends the walk.

use markethub_domain::{Listing, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::json::JsonClient;
use super::request::RequestOptions;

impl JsonClient {
    /// Fetch `url` and every page linked from it, reusing `options` for each
    /// page.
    ///
    /// `next` links are used verbatim. A cyclic chain is not detected.
    ///
    /// # Errors
    /// Returns the first page error; items from earlier pages are discarded.
    #[instrument(skip(self, options), fields(url = %url))]
    pub async fn collect_all<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut pages = 0_usize;
        let mut next = Some(url.to_string());

        while let Some(page_url) = next.take() {
            let listing: Listing<T> = self.request(&page_url, options).await?;
            let (results, following) = listing.into_parts();

            pages += 1;
            items.extend(results);
            next = following;
        }

        debug!(pages, items = items.len(), "Collected listing");
        Ok(items)
    }
}
