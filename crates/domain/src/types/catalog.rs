//! Catalog service wire types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogImage {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVariant {
    pub id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(deserialize_with = "super::de::amount")]
    pub price: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    pub seller_id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Only present on detail responses.
    #[serde(default)]
    pub variants: Vec<CatalogVariant>,
    #[serde(default)]
    pub images: Vec<CatalogImage>,
}

impl CatalogProduct {
    /// Look up a variant by id.
    #[must_use]
    pub fn variant(&self, variant_id: i64) -> Option<&CatalogVariant> {
        self.variants.iter().find(|variant| variant.id == variant_id)
    }

    /// First image by position, used as the product thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&CatalogImage> {
        self.images.iter().min_by_key(|image| image.position)
    }
}
