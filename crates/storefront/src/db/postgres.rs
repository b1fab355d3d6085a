//! `PostgreSQL` Data Store.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) and rows are
//! converted into validated domain types. A row that fails validation (bad
//! slug, negative price) surfaces as `StoreError::DataCorruption`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crumb_haven_core::{
    ContactSubmissionId, NewsletterSubscriptionId, Price, ProductFeatureId, ProductId, Slug,
    TestimonialId,
};

use super::{DataStore, StoreError};
use crate::models::{
    ContactSubmission, NewContactSubmission, NewNewsletterSubscription, NewsletterSubscription,
    Product, ProductFeature, SeedCatalog, Testimonial,
};

const PRODUCT_COLUMNS: &str = "id, slug, name, description, short_description, category, badge, \
                               price, sale_price, image_url, is_featured";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    slug: String,
    name: String,
    description: String,
    short_description: String,
    category: String,
    badge: Option<String>,
    price: Decimal,
    sale_price: Option<Decimal>,
    image_url: String,
    is_featured: bool,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            StoreError::DataCorruption(format!("invalid slug for product {}: {e}", row.id))
        })?;
        let price = Price::new(row.price).map_err(|e| {
            StoreError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;
        let sale_price = row
            .sale_price
            .map(Price::new)
            .transpose()
            .map_err(|e| {
                StoreError::DataCorruption(format!("invalid sale price for product {}: {e}", row.id))
            })?;

        Ok(Self {
            id: ProductId::new(row.id),
            slug,
            name: row.name,
            description: row.description,
            short_description: row.short_description,
            category: row.category,
            badge: row.badge,
            price,
            sale_price,
            image_url: row.image_url,
            is_featured: row.is_featured,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FeatureRow {
    id: i32,
    product_id: i32,
    feature: String,
    position: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct TestimonialRow {
    id: i32,
    name: String,
    location: Option<String>,
    rating: i16,
    content: String,
}

/// Summary of a catalog import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Products inserted (existing slugs are skipped).
    pub products: u64,
    /// Feature lines inserted.
    pub features: u64,
    /// Testimonials inserted (existing IDs are skipped).
    pub testimonials: u64,
}

/// Data Store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_products(&self, featured_only: bool) -> Result<Vec<Product>, StoreError> {
        let sql = if featured_only {
            format!(
                "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE is_featured ORDER BY id"
            )
        } else {
            format!("SELECT {PRODUCT_COLUMNS} FROM storefront.product ORDER BY id")
        };

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Import a catalog in a single transaction.
    ///
    /// Idempotent: products whose slug already exists are left untouched
    /// (including their features), as are testimonials whose ID exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if any statement fails; nothing is
    /// committed in that case.
    pub async fn import_catalog(&self, catalog: &SeedCatalog) -> Result<ImportSummary, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut summary = ImportSummary::default();

        for seed in &catalog.products {
            let p = &seed.product;
            let inserted: Option<i32> = sqlx::query_scalar(
                r"
                INSERT INTO storefront.product
                    (id, slug, name, description, short_description, category, badge,
                     price, sale_price, image_url, is_featured)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (slug) DO NOTHING
                RETURNING id
                ",
            )
            .bind(p.id)
            .bind(p.slug.as_str())
            .bind(&p.name)
            .bind(&p.description)
            .bind(&p.short_description)
            .bind(&p.category)
            .bind(p.badge.as_deref())
            .bind(p.price.amount())
            .bind(p.sale_price.map(|s| s.amount()))
            .bind(&p.image_url)
            .bind(p.is_featured)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(product_id) = inserted else {
                tracing::debug!(slug = %p.slug, "Product already present, skipping");
                continue;
            };
            summary.products += 1;

            for (position, feature) in (0_i32..).zip(&seed.features) {
                sqlx::query(
                    r"
                    INSERT INTO storefront.product_feature (product_id, feature, position)
                    VALUES ($1, $2, $3)
                    ",
                )
                .bind(product_id)
                .bind(feature)
                .bind(position)
                .execute(&mut *tx)
                .await?;
                summary.features += 1;
            }
        }

        for t in &catalog.testimonials {
            let result = sqlx::query(
                r"
                INSERT INTO storefront.testimonial (id, name, location, rating, content)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO NOTHING
                ",
            )
            .bind(t.id)
            .bind(&t.name)
            .bind(t.location.as_deref())
            .bind(t.rating)
            .bind(&t.content)
            .execute(&mut *tx)
            .await?;
            summary.testimonials += result.rows_affected();
        }

        // Explicit IDs bypass the sequences; move them past the imported rows.
        for table in ["product", "testimonial"] {
            sqlx::query(&format!(
                "SELECT setval(pg_get_serial_sequence('storefront.{table}', 'id'), \
                 COALESCE((SELECT MAX(id) FROM storefront.{table}), 0) + 1, false)"
            ))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(summary)
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        self.fetch_products(false).await
    }

    async fn featured_products(&self) -> Result<Vec<Product>, StoreError> {
        self.fetch_products(true).await
    }

    async fn product_by_slug(&self, slug: &Slug) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE slug = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    async fn product_features(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductFeature>, StoreError> {
        let rows = sqlx::query_as::<_, FeatureRow>(
            r"
            SELECT id, product_id, feature, position
            FROM storefront.product_feature
            WHERE product_id = $1
            ORDER BY position, id
            ",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductFeature {
                id: ProductFeatureId::new(r.id),
                product_id: ProductId::new(r.product_id),
                feature: r.feature,
                position: r.position,
            })
            .collect())
    }

    async fn testimonials(&self) -> Result<Vec<Testimonial>, StoreError> {
        let rows = sqlx::query_as::<_, TestimonialRow>(
            r"
            SELECT id, name, location, rating, content
            FROM storefront.testimonial
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Testimonial {
                id: TestimonialId::new(r.id),
                name: r.name,
                location: r.location,
                rating: r.rating,
                content: r.content,
            })
            .collect())
    }

    async fn create_contact_submission(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, StoreError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO storefront.contact_submission (name, email, subject, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&submission.name)
        .bind(submission.email.as_str())
        .bind(&submission.subject)
        .bind(&submission.message)
        .bind(submission.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(ContactSubmission {
            id: ContactSubmissionId::new(id),
            name: submission.name,
            email: submission.email,
            subject: submission.subject,
            message: submission.message,
            created_at: submission.created_at,
        })
    }

    async fn create_newsletter_subscription(
        &self,
        subscription: NewNewsletterSubscription,
    ) -> Result<NewsletterSubscription, StoreError> {
        let result: Result<(i32, DateTime<Utc>), sqlx::Error> = sqlx::query_as(
            r"
            INSERT INTO storefront.newsletter_subscription (email, created_at)
            VALUES ($1, $2)
            RETURNING id, created_at
            ",
        )
        .bind(subscription.email.as_str())
        .bind(subscription.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok((id, created_at)) => Ok(NewsletterSubscription {
                id: NewsletterSubscriptionId::new(id),
                email: subscription.email,
                created_at,
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                StoreError::Conflict(format!("{} is already subscribed", subscription.email)),
            ),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row() -> ProductRow {
        ProductRow {
            id: 1,
            slug: "almond-oat".to_string(),
            name: "Almond Oat Cookies".to_string(),
            description: "Crunchy".to_string(),
            short_description: "Oats".to_string(),
            category: "cookies".to_string(),
            badge: None,
            price: Decimal::new(29_900, 2),
            sale_price: Some(Decimal::new(24_900, 2)),
            image_url: "/images/almond-oat.png".to_string(),
            is_featured: true,
        }
    }

    #[test]
    fn test_row_converts_to_product() {
        let product = Product::try_from(row()).unwrap();
        assert_eq!(product.slug.as_str(), "almond-oat");
        assert_eq!(
            product.sale_price.map(|p| p.amount()),
            Some(Decimal::new(24_900, 2))
        );
    }

    #[test]
    fn test_invalid_slug_is_data_corruption() {
        let bad = ProductRow {
            slug: "Almond Oat".to_string(),
            ..row()
        };
        assert!(matches!(
            Product::try_from(bad),
            Err(StoreError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_negative_price_is_data_corruption() {
        let bad = ProductRow {
            sale_price: Some(Decimal::new(-1, 0)),
            ..row()
        };
        assert!(matches!(
            Product::try_from(bad),
            Err(StoreError::DataCorruption(_))
        ));
    }
}
