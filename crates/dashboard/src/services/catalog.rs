//! Stores, products and their images.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use vendor_hub_core::{Coordinates, ProductId, StoreId, StoreStatus, VendorId};

use super::{ServiceError, ValidationError};
use crate::backend::{AccessToken, Backend};
use crate::config::StorageConfig;
use crate::models::{
    NewProduct, NewStore, Product, ProductUpdate, SocialLinks, Store, StoreUpdate,
};

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Store form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<StoreStatus>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
}

impl StoreDraft {
    /// Validate the draft into an insert payload for `vendor`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name, a non-http(s) social
    /// link or invalid pickup coordinates.
    pub fn into_new_store(self, vendor: VendorId) -> Result<NewStore, ValidationError> {
        let name = required_text("name", &self.name)?;
        let social_links = normalize_social_links(self.social_links)?;
        Coordinates::from_parts(self.latitude, self.longitude)?;

        Ok(NewStore {
            vendor_id: vendor,
            name,
            description: optional_text(self.description),
            status: self.status.unwrap_or_default(),
            address: optional_text(self.address),
            latitude: self.latitude,
            longitude: self.longitude,
            categories: normalize_categories(self.categories),
            social_links,
        })
    }
}

/// Validate a partial store update with the same rules as [`StoreDraft`].
///
/// # Errors
///
/// Returns a [`ValidationError`] for a blank name, a bad link or coordinates.
pub fn validate_store_update(mut update: StoreUpdate) -> Result<StoreUpdate, ValidationError> {
    if let Some(name) = update.name.take() {
        update.name = Some(required_text("name", &name)?);
    }
    if let Some(links) = update.social_links.take() {
        update.social_links = Some(normalize_social_links(links)?);
    }
    if let Some(categories) = update.categories.take() {
        update.categories = Some(normalize_categories(categories));
    }
    for (field, url) in [("logo_url", &update.logo_url), ("banner_url", &update.banner_url)] {
        if let Some(url) = url {
            check_http_url(field, url)?;
        }
    }
    Coordinates::from_parts(update.latitude, update.longitude)?;
    Ok(update)
}

/// Product form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub length_cm: Option<Decimal>,
    #[serde(default)]
    pub width_cm: Option<Decimal>,
    #[serde(default)]
    pub height_cm: Option<Decimal>,
    #[serde(default)]
    pub weight_kg: Option<Decimal>,
}

impl ProductDraft {
    /// Validate the draft into an insert payload for `store`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name, a negative price, cost
    /// or stock, or a non-positive dimension or weight.
    pub fn into_new_product(self, store: StoreId) -> Result<NewProduct, ValidationError> {
        let name = required_text("name", &self.name)?;
        check_non_negative("price", Some(self.price))?;
        check_non_negative("cost_price", self.cost_price)?;
        let stock = self.stock.unwrap_or(0);
        if stock < 0 {
            return Err(ValidationError::new("stock", "cannot be negative"));
        }
        check_measurements(
            self.length_cm,
            self.width_cm,
            self.height_cm,
            self.weight_kg,
        )?;

        Ok(NewProduct {
            store_id: store,
            name,
            short_description: optional_text(self.short_description),
            description: optional_text(self.description),
            category: optional_text(self.category),
            price: self.price,
            cost_price: self.cost_price,
            stock,
            is_active: self.is_active.unwrap_or(true),
            length_cm: self.length_cm,
            width_cm: self.width_cm,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
        })
    }
}

/// Validate a partial product update with the same rules as [`ProductDraft`].
///
/// # Errors
///
/// Returns a [`ValidationError`] for the first field that fails.
pub fn validate_product_update(
    mut update: ProductUpdate,
) -> Result<ProductUpdate, ValidationError> {
    if let Some(name) = update.name.take() {
        update.name = Some(required_text("name", &name)?);
    }
    check_non_negative("price", update.price)?;
    check_non_negative("cost_price", update.cost_price)?;
    if update.stock.is_some_and(|s| s < 0) {
        return Err(ValidationError::new("stock", "cannot be negative"));
    }
    if let Some(url) = &update.image_url {
        check_http_url("image_url", url)?;
    }
    check_measurements(
        update.length_cm,
        update.width_cm,
        update.height_cm,
        update.weight_kg,
    )?;
    Ok(update)
}

/// Which image slot an upload fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Logo,
    Banner,
    Product,
}

impl ImageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Banner => "banner",
            Self::Product => "product",
        }
    }
}

impl std::str::FromStr for ImageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logo" => Ok(Self::Logo),
            "banner" => Ok(Self::Banner),
            "product" => Ok(Self::Product),
            _ => Err(format!("invalid image kind: {s}")),
        }
    }
}

/// A file received from the dashboard.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// File extension for the upload's content type.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the file is empty, too large or not
    /// a supported image type.
    pub fn extension(&self) -> Result<&'static str, ValidationError> {
        if self.bytes.is_empty() {
            return Err(ValidationError::new("file", "is empty"));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::new("file", "must be at most 5 MiB"));
        }
        match self.content_type.as_str() {
            "image/png" => Ok("png"),
            "image/jpeg" => Ok("jpg"),
            "image/webp" => Ok("webp"),
            "image/gif" => Ok("gif"),
            other => Err(ValidationError::new(
                "file",
                format!("unsupported content type {other}"),
            )),
        }
    }
}

/// Object path for an image: `<store_id>/<kind>-<uuid>.<ext>`.
#[must_use]
pub fn image_path(store: StoreId, kind: ImageKind, ext: &str) -> String {
    format!("{store}/{}-{}.{ext}", kind.as_str(), uuid::Uuid::new_v4())
}

/// Store and product management for one signed-in vendor.
pub struct CatalogService<'a> {
    backend: &'a dyn Backend,
    token: &'a AccessToken,
    storage: &'a StorageConfig,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(
        backend: &'a dyn Backend,
        token: &'a AccessToken,
        storage: &'a StorageConfig,
    ) -> Self {
        Self {
            backend,
            token,
            storage,
        }
    }

    // Stores

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the backend call fails.
    pub async fn list_stores(&self, vendor: VendorId) -> Result<Vec<Store>, ServiceError> {
        Ok(self.backend.list_stores(self.token, vendor).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the store is not visible or the call fails.
    pub async fn get_store(&self, id: StoreId) -> Result<Store, ServiceError> {
        Ok(self.backend.get_store(self.token, id).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an invalid draft, otherwise
    /// `ServiceError::Backend` if the insert fails.
    #[instrument(skip(self, draft), fields(vendor_id = %vendor))]
    pub async fn create_store(
        &self,
        vendor: VendorId,
        draft: StoreDraft,
    ) -> Result<Store, ServiceError> {
        let new_store = draft.into_new_store(vendor)?;
        let store = self.backend.create_store(self.token, &new_store).await?;
        tracing::info!(store_id = %store.id, "Store created");
        Ok(store)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an invalid update, otherwise
    /// `ServiceError::Backend` if the write fails.
    #[instrument(skip(self, update), fields(store_id = %id))]
    pub async fn update_store(
        &self,
        id: StoreId,
        update: StoreUpdate,
    ) -> Result<Store, ServiceError> {
        let update = validate_store_update(update)?;
        Ok(self.backend.update_store(self.token, id, &update).await?)
    }

    /// Upload a logo or banner and point the store at it.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a bad file or a `Product` kind
    /// - `ServiceError::Backend` if the upload or the store update fails
    #[instrument(skip(self, upload), fields(store_id = %store, kind = kind.as_str()))]
    pub async fn upload_store_image(
        &self,
        store: StoreId,
        kind: ImageKind,
        upload: ImageUpload,
    ) -> Result<Store, ServiceError> {
        if kind == ImageKind::Product {
            return Err(ValidationError::new("kind", "must be logo or banner").into());
        }
        let ext = upload.extension()?;
        // Checks the store is visible before anything is written to storage.
        self.backend.get_store(self.token, store).await?;

        let url = self
            .backend
            .upload_object(
                self.token,
                &self.storage.store_assets_bucket,
                &image_path(store, kind, ext),
                &upload.content_type,
                upload.bytes,
            )
            .await?;

        let mut update = StoreUpdate::default();
        if kind == ImageKind::Logo {
            update.logo_url = Some(url);
        } else {
            update.banner_url = Some(url);
        }
        Ok(self.backend.update_store(self.token, store, &update).await?)
    }

    // Products

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the backend call fails.
    pub async fn list_products(&self, store: StoreId) -> Result<Vec<Product>, ServiceError> {
        Ok(self.backend.list_products(self.token, store).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an invalid draft, otherwise
    /// `ServiceError::Backend` if the insert fails.
    #[instrument(skip(self, draft), fields(store_id = %store))]
    pub async fn create_product(
        &self,
        store: StoreId,
        draft: ProductDraft,
    ) -> Result<Product, ServiceError> {
        let new_product = draft.into_new_product(store)?;
        let product = self.backend.create_product(self.token, &new_product).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an invalid update, otherwise
    /// `ServiceError::Backend` if the write fails.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ServiceError> {
        let update = validate_product_update(update)?;
        Ok(self.backend.update_product(self.token, id, &update).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the product is not visible or the call fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ServiceError> {
        self.backend.delete_product(self.token, id).await?;
        tracing::info!("Product deleted");
        Ok(())
    }

    /// Upload a product photo and point the product at it.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a bad file
    /// - `ServiceError::Backend` if the product is not visible or a write fails
    #[instrument(skip(self, upload), fields(product_id = %id))]
    pub async fn upload_product_image(
        &self,
        id: ProductId,
        upload: ImageUpload,
    ) -> Result<Product, ServiceError> {
        let ext = upload.extension()?;
        let product = self.backend.get_product(self.token, id).await?;

        let url = self
            .backend
            .upload_object(
                self.token,
                &self.storage.product_images_bucket,
                &image_path(product.store_id, ImageKind::Product, ext),
                &upload.content_type,
                upload.bytes,
            )
            .await?;

        let update = ProductUpdate {
            image_url: Some(url),
            ..ProductUpdate::default()
        };
        Ok(self.backend.update_product(self.token, id, &update).await?)
    }
}

fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(value.to_string())
}

/// Trimmed text, or `None` when blank.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_http_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let url = Url::parse(value).map_err(|_| ValidationError::new(field, "must be a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::new(field, "must be an http(s) URL"));
    }
    Ok(())
}

fn normalize_social_links(links: SocialLinks) -> Result<SocialLinks, ValidationError> {
    let normalize = |field: &'static str, url: Option<String>| -> Result<Option<String>, ValidationError> {
        match optional_text(url) {
            Some(url) => {
                check_http_url(field, &url)?;
                Ok(Some(url))
            }
            None => Ok(None),
        }
    };
    Ok(SocialLinks {
        website: normalize("website", links.website)?,
        facebook: normalize("facebook", links.facebook)?,
        instagram: normalize("instagram", links.instagram)?,
        tiktok: normalize("tiktok", links.tiktok)?,
    })
}

/// Trim, drop blanks and drop case-insensitive duplicates, keeping the first spelling.
fn normalize_categories(categories: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    categories
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && seen.insert(c.to_lowercase()))
        .collect()
}

fn check_non_negative(field: &'static str, value: Option<Decimal>) -> Result<(), ValidationError> {
    if value.is_some_and(|v| v < Decimal::ZERO) {
        return Err(ValidationError::new(field, "cannot be negative"));
    }
    Ok(())
}

fn check_measurements(
    length: Option<Decimal>,
    width: Option<Decimal>,
    height: Option<Decimal>,
    weight: Option<Decimal>,
) -> Result<(), ValidationError> {
    for (field, value) in [
        ("length_cm", length),
        ("width_cm", width),
        ("height_cm", height),
        ("weight_kg", weight),
    ] {
        if value.is_some_and(|v| v <= Decimal::ZERO) {
            return Err(ValidationError::new(field, "must be greater than 0"));
        }
    }
    Ok(())
}
