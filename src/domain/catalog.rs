use chrono::{DateTime, Utc};

use super::geo::GeoCoordinate;
use super::ranking::{Located, Ranked, rank};
use crate::models::Product;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub text: Option<String>,
    pub category: Option<String>,
    pub origin: Option<GeoCoordinate>,
}

/// Builds the consumer-facing view of `products`.
///
/// Steps run in a fixed order: drop anything expiring at or before `now`, match `text`
/// against name or description (case-insensitive), match `category` exactly, then rank by
/// the farmer's distance from `origin`. When no origin is given, or no surviving product
/// has a located farmer, the incoming order is kept.
pub fn filter(products: Vec<Product>, query: &CatalogQuery, now: DateTime<Utc>) -> Vec<Ranked<Product>> {
    let needle = query
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);

    let survivors: Vec<Product> = products
        .into_iter()
        .filter(|p| p.expiration_date > now)
        .filter(|p| match &needle {
            Some(needle) => {
                p.name.to_lowercase().contains(needle.as_str())
                    || p.description.to_lowercase().contains(needle.as_str())
            }
            None => true,
        })
        .filter(|p| category.is_none_or(|c| p.category == c))
        .collect();

    let origin = query
        .origin
        .filter(|_| survivors.iter().any(|p| p.location().is_some()));
    rank(origin, survivors)
}
