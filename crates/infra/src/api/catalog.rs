//! Catalog service client
//!
//! The catalog is public: requests carry no credentials.

use std::collections::HashMap;

use futures::future::try_join_all;
use markethub_domain::constants::{CATALOG_CATEGORIES_PATH, CATALOG_PRODUCTS_PATH};
use markethub_domain::{CatalogCategory, CatalogProduct, Result};
use tracing::{debug, instrument};

use crate::http::{JsonClient, RequestOptions};

/// A category together with the products filed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryWithProducts {
    pub category: CatalogCategory,
    pub products: Vec<CatalogProduct>,
}

#[derive(Debug, Clone)]
pub struct CatalogApi {
    base_url: String,
    json: JsonClient,
}

impl CatalogApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>, json: JsonClient) -> Self {
        Self { base_url: base_url.into(), json }
    }

    fn product_url(&self, id: i64) -> String {
        format!("{}{CATALOG_PRODUCTS_PATH}{id}/", self.base_url)
    }

    /// Every category, across all pages.
    ///
    /// # Errors
    /// Returns the first failing page's error.
    pub async fn categories(&self) -> Result<Vec<CatalogCategory>> {
        let url = format!("{}{CATALOG_CATEGORIES_PATH}", self.base_url);
        self.json.collect_all(&url, &RequestOptions::get()).await
    }

    /// Every product summary, across all pages.
    ///
    /// # Errors
    /// Returns the first failing page's error.
    pub async fn products(&self) -> Result<Vec<CatalogProduct>> {
        let url = format!("{}{CATALOG_PRODUCTS_PATH}", self.base_url);
        self.json.collect_all(&url, &RequestOptions::get()).await
    }

    /// Product detail, including variants and images.
    ///
    /// # Errors
    /// Returns `MarketHubError::Request` (status 404) for an unknown id.
    #[instrument(skip(self))]
    pub async fn product(&self, id: i64) -> Result<CatalogProduct> {
        self.json.request(&self.product_url(id), &RequestOptions::get()).await
    }

    /// Product detail looked up by slug; `None` if no product has it.
    ///
    /// # Errors
    /// Returns listing or detail request errors.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<CatalogProduct>> {
        let products = self.products().await?;
        let Some(summary) = products.iter().find(|product| product.slug == slug) else {
            debug!("No product with this slug");
            return Ok(None);
        };

        self.product(summary.id).await.map(Some)
    }

    /// Category by slug with its products; `None` if the slug is unknown.
    ///
    /// # Errors
    /// Returns listing request errors.
    #[instrument(skip(self))]
    pub async fn category_with_products(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryWithProducts>> {
        let (categories, products) = futures::try_join!(self.categories(), self.products())?;

        let Some(category) = categories.into_iter().find(|category| category.slug == slug) else {
            debug!("No category with this slug");
            return Ok(None);
        };

        let products =
            products.into_iter().filter(|product| product.category == Some(category.id)).collect();
        Ok(Some(CategoryWithProducts { category, products }))
    }

    /// Details of several products fetched concurrently, keyed by id.
    ///
    /// Duplicate ids are fetched once.
    ///
    /// # Errors
    /// Fails if any single detail request fails.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn products_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, CatalogProduct>> {
        let mut unique: Vec<i64> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let products = try_join_all(unique.iter().map(|id| self.product(*id))).await?;
        Ok(products.into_iter().map(|product| (product.id, product)).collect())
    }
}
