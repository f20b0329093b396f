//! Seed the store layout and product catalog.
//!
//! Reads a YAML catalog of store locations and products and upserts them by
//! name, so the command can be re-run after editing the file.
//!
//! ```yaml
//! locations:
//!   - name: Produce
//!     aisle: "1"
//!     sort_order: 10
//! products:
//!   - name: Bananas
//!     category: Fruit
//!     unit: bunch
//!     location: Produce
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};
use weekly_shop_web::db;

/// A catalog file.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub locations: Vec<LocationEntry>,
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

#[derive(Debug, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    pub aisle: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ProductEntry {
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    /// Name of a location in the same file.
    pub location: String,
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub locations: usize,
    pub products: usize,
}

/// Problems that make a catalog unusable. Empty when the catalog is valid.
#[must_use]
pub fn validate_catalog(catalog: &Catalog) -> Vec<String> {
    let mut errors = Vec::new();

    let mut location_names = HashSet::new();
    for location in &catalog.locations {
        if location.name.trim().is_empty() {
            errors.push("location with an empty name".to_string());
        } else if !location_names.insert(location.name.as_str()) {
            errors.push(format!("duplicate location '{}'", location.name));
        }
    }

    let mut product_names = HashSet::new();
    for product in &catalog.products {
        if product.name.trim().is_empty() {
            errors.push("product with an empty name".to_string());
        } else if !product_names.insert(product.name.as_str()) {
            errors.push(format!("duplicate product '{}'", product.name));
        }
        if !location_names.contains(product.location.as_str()) {
            errors.push(format!(
                "product '{}' uses unknown location '{}'",
                product.name, product.location
            ));
        }
    }

    errors
}

/// Seed the catalog from a YAML file.
///
/// With `check_only`, stops after validation without connecting.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database operation fails.
pub async fn catalog(file_path: &str, check_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: Catalog = serde_yaml::from_str(&content)?;
    info!(
        locations = catalog.locations.len(),
        products = catalog.products.len(),
        "Parsed catalog"
    );

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    if check_only {
        info!("Catalog is valid");
        return Ok(());
    }

    let database_url = super::database_url().map_err(|var| format!("{var} not set"))?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let summary = upsert_catalog(&pool, &catalog).await?;
    info!("Seeding complete!");
    info!("  Locations upserted: {}", summary.locations);
    info!("  Products upserted: {}", summary.products);

    Ok(())
}

/// Upsert every location, then every product, in one transaction.
async fn upsert_catalog(pool: &PgPool, catalog: &Catalog) -> Result<SeedSummary, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for location in &catalog.locations {
        sqlx::query(
            r"
            INSERT INTO shop.store_location (name, aisle, sort_order)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET aisle = EXCLUDED.aisle, sort_order = EXCLUDED.sort_order
            ",
        )
        .bind(&location.name)
        .bind(&location.aisle)
        .bind(location.sort_order)
        .execute(&mut *tx)
        .await?;
        summary.locations += 1;
    }

    for product in &catalog.products {
        sqlx::query(
            r"
            INSERT INTO shop.product (name, category, unit, location_id)
            SELECT $1, $2, $3, l.id
            FROM shop.store_location l
            WHERE l.name = $4
            ON CONFLICT (name) DO UPDATE
            SET category = EXCLUDED.category,
                unit = EXCLUDED.unit,
                location_id = EXCLUDED.location_id
            ",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(&product.location)
        .execute(&mut *tx)
        .await?;
        summary.products += 1;
    }

    tx.commit().await?;
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Catalog {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let catalog = parse(include_str!("../../seed/catalog.yaml"));
        assert!(!catalog.products.is_empty());
        assert_eq!(validate_catalog(&catalog), Vec::<String>::new());
    }

    #[test]
    fn test_optional_fields_default() {
        let catalog = parse(
            "locations:\n  - name: Bakery\nproducts:\n  - name: Bread\n    location: Bakery\n",
        );
        let location = catalog.locations.first().unwrap();
        assert_eq!(location.sort_order, 0);
        assert!(location.aisle.is_none());
        assert!(catalog.products.first().unwrap().unit.is_none());
    }

    #[test]
    fn test_validation_errors() {
        let catalog = parse(
            "locations:\n  - name: Bakery\n  - name: Bakery\nproducts:\n  - name: Eggs\n    location: Dairy\n  - name: Eggs\n    location: Bakery\n",
        );
        let errors = validate_catalog(&catalog);
        assert_eq!(
            errors,
            vec![
                "duplicate location 'Bakery'".to_string(),
                "product 'Eggs' uses unknown location 'Dairy'".to_string(),
                "duplicate product 'Eggs'".to_string(),
            ]
        );
    }
}
