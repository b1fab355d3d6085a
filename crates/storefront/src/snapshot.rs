//! Static JSON snapshots used when the Data Store cannot answer a read.
//!
//! Layout, relative to the snapshot directory:
//!
//! ```text
//! products.json
//! featured-products.json
//! testimonials.json
//! products/<slug>.json
//! ```
//!
//! The reader never touches the cache: during an outage every request
//! re-reads the file. The writer is only used by `crumb-cli snapshot export`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crumb_haven_core::Slug;

use crate::models::{Product, ProductDetails, Testimonial};

/// A resource that has a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotResource<'a> {
    Products,
    FeaturedProducts,
    Testimonials,
    Product(&'a Slug),
}

impl SnapshotResource<'_> {
    /// Path of the snapshot file relative to the snapshot directory.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Self::Products => PathBuf::from("products.json"),
            Self::FeaturedProducts => PathBuf::from("featured-products.json"),
            Self::Testimonials => PathBuf::from("testimonials.json"),
            Self::Product(slug) => Path::new("products").join(format!("{slug}.json")),
        }
    }
}

impl fmt::Display for SnapshotResource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => f.write_str("products"),
            Self::FeaturedProducts => f.write_str("featured products"),
            Self::Testimonials => f.write_str("testimonials"),
            Self::Product(slug) => write!(f, "product {slug}"),
        }
    }
}

/// Errors reading or writing snapshot files.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed snapshot {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads snapshot files from a directory.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    root: PathBuf,
}

impl SnapshotReader {
    /// Create a reader over `root`. The directory does not need to exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read and decode the snapshot for `resource`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file does not exist, `Io` if it cannot be read,
    /// `Parse` if its contents do not decode as `T`.
    pub async fn read<T: DeserializeOwned>(
        &self,
        resource: SnapshotResource<'_>,
    ) -> Result<T, SnapshotError> {
        let path = self.root.join(resource.relative_path());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SnapshotError::NotFound { path });
            }
            Err(source) => return Err(SnapshotError::Io { path, source }),
        };

        serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Parse { path, source })
    }

    /// Read `products.json`.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub async fn products(&self) -> Result<Vec<Product>, SnapshotError> {
        self.read(SnapshotResource::Products).await
    }

    /// Read `featured-products.json`.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub async fn featured_products(&self) -> Result<Vec<Product>, SnapshotError> {
        self.read(SnapshotResource::FeaturedProducts).await
    }

    /// Read `testimonials.json`.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub async fn testimonials(&self) -> Result<Vec<Testimonial>, SnapshotError> {
        self.read(SnapshotResource::Testimonials).await
    }

    /// Read `products/<slug>.json`.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub async fn product_details(&self, slug: &Slug) -> Result<ProductDetails, SnapshotError> {
        self.read(SnapshotResource::Product(slug)).await
    }
}

/// Writes snapshot files into a directory, creating it as needed.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    root: PathBuf,
}

impl SnapshotWriter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write `data` as pretty-printed JSON and return the file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory or file cannot be written, `Parse` if
    /// `data` cannot be serialized.
    pub async fn write<T: Serialize + Sync>(
        &self,
        resource: SnapshotResource<'_>,
        data: &T,
    ) -> Result<PathBuf, SnapshotError> {
        let path = self.root.join(resource.relative_path());

        let mut json = serde_json::to_vec_pretty(data).map_err(|source| SnapshotError::Parse {
            path: path.clone(),
            source,
        })?;
        json.push(b'\n');

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SnapshotError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&path, json)
            .await
            .map_err(|source| SnapshotError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::SeedCatalog;

    fn slug(s: &str) -> Slug {
        Slug::parse(s).unwrap()
    }

    #[test]
    fn test_relative_paths() {
        assert_eq!(
            SnapshotResource::Products.relative_path(),
            PathBuf::from("products.json")
        );
        assert_eq!(
            SnapshotResource::FeaturedProducts.relative_path(),
            PathBuf::from("featured-products.json")
        );
        assert_eq!(
            SnapshotResource::Testimonials.relative_path(),
            PathBuf::from("testimonials.json")
        );
        let almond = slug("almond-oat");
        assert_eq!(
            SnapshotResource::Product(&almond).relative_path(),
            Path::new("products").join("almond-oat.json")
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let reader = SnapshotReader::new(dir.path());

        assert!(matches!(
            reader.products().await,
            Err(SnapshotError::NotFound { .. })
        ));
        assert!(matches!(
            reader.product_details(&slug("does-not-exist")).await,
            Err(SnapshotError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("testimonials.json"), "{ not json").unwrap();
        let reader = SnapshotReader::new(dir.path());

        let err = reader.testimonials().await.unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
        assert!(err.to_string().contains("testimonials.json"));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("products.json"), r#"{"product": 1}"#).unwrap();
        let reader = SnapshotReader::new(dir.path());

        assert!(matches!(
            reader.products().await,
            Err(SnapshotError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_directory_in_place_of_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("products.json")).unwrap();
        let reader = SnapshotReader::new(dir.path());

        assert!(matches!(
            reader.products().await,
            Err(SnapshotError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_writer_output_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = SeedCatalog::bundled().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("nested"));
        let reader = SnapshotReader::new(dir.path().join("nested"));

        writer
            .write(SnapshotResource::Products, &catalog.product_list())
            .await
            .unwrap();
        let seed = catalog.products.first().unwrap();
        let path = writer
            .write(SnapshotResource::Product(&seed.product.slug), &seed.details())
            .await
            .unwrap();
        assert!(path.ends_with(Path::new("products").join(format!("{}.json", seed.product.slug))));

        assert_eq!(reader.products().await.unwrap(), catalog.product_list());
        assert_eq!(
            reader
                .product_details(&seed.product.slug)
                .await
                .unwrap(),
            seed.details()
        );
    }

    #[tokio::test]
    async fn test_bundled_snapshots_match_seed_catalog() {
        let reader = SnapshotReader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/snapshots"));
        let catalog = SeedCatalog::bundled().unwrap();

        assert_eq!(reader.products().await.unwrap(), catalog.product_list());
        assert_eq!(
            reader.featured_products().await.unwrap(),
            catalog.featured_products()
        );
        assert_eq!(reader.testimonials().await.unwrap(), catalog.testimonials);
        for seed in &catalog.products {
            assert_eq!(
                reader.product_details(&seed.product.slug).await.unwrap(),
                seed.details()
            );
        }
    }
}
