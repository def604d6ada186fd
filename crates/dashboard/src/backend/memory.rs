//! In-memory [`Backend`] for tests and local demos.
//!
//! Mirrors the hosted backend's contracts closely enough for the services to
//! be exercised end to end: password sign-in issues opaque tokens, rows are
//! only visible to the vendor owning the store (standing in for row-level
//! security), coupon codes are unique per store, and the reporting RPCs are
//! computed from the stored orders.
//!
//! Every trait call is counted so tests can assert that validation failures
//! never reach the backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use vendor_hub_core::{
    CouponId, DeliveryStatus, Email, NotificationId, OrderId, ProductId, ReviewId, StoreId,
    VendorId,
};

use super::{AccessToken, Backend, BackendError};
use crate::models::{
    AuthSession, AuthUser, Coupon, CouponUpdate, DeliveryDetailsUpdate, MonthlyRevenue,
    NewCoupon, NewNotification, NewProduct, NewStore, Notification, Order, Product,
    ProductUpdate, Review, RevenueSummary, Store, StoreUpdate, TopProduct,
};

const PUBLIC_STORAGE_BASE: &str = "https://storage.memory.local";
const TOKEN_TTL_SECONDS: i64 = 3600;

/// An object held by the in-memory storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

struct MemoryUser {
    id: VendorId,
    email: Email,
    password: String,
}

#[derive(Default)]
struct State {
    users: HashMap<Email, MemoryUser>,
    sessions: HashMap<String, VendorId>,
    stores: HashMap<StoreId, Store>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    coupons: HashMap<CouponId, Coupon>,
    reviews: HashMap<ReviewId, Review>,
    notifications: HashMap<NotificationId, Notification>,
    objects: HashMap<String, StoredObject>,
}

impl State {
    fn user(&self, token: &AccessToken) -> Result<VendorId, BackendError> {
        self.sessions
            .get(token.expose())
            .copied()
            .ok_or_else(|| BackendError::Unauthorized("invalid JWT".to_string()))
    }

    /// The store, if it exists and belongs to `vendor`.
    fn owned_store(&self, vendor: VendorId, id: StoreId) -> Result<&Store, BackendError> {
        self.stores
            .get(&id)
            .filter(|s| s.vendor_id == vendor)
            .ok_or_else(|| BackendError::NotFound(format!("stores {id}")))
    }

    fn owns(&self, vendor: VendorId, store: StoreId) -> bool {
        self.owned_store(vendor, store).is_ok()
    }

    fn visible_order(&mut self, vendor: VendorId, id: OrderId) -> Result<&mut Order, BackendError> {
        let store = self.orders.get(&id).map(|o| o.store_id);
        match store {
            Some(store) if self.owns(vendor, store) => self
                .orders
                .get_mut(&id)
                .ok_or_else(|| BackendError::NotFound(format!("orders {id}"))),
            _ => Err(BackendError::NotFound(format!("orders {id}"))),
        }
    }

    fn visible_product(
        &mut self,
        vendor: VendorId,
        id: ProductId,
    ) -> Result<&mut Product, BackendError> {
        let store = self.products.get(&id).map(|p| p.store_id);
        match store {
            Some(store) if self.owns(vendor, store) => self
                .products
                .get_mut(&id)
                .ok_or_else(|| BackendError::NotFound(format!("products {id}"))),
            _ => Err(BackendError::NotFound(format!("products {id}"))),
        }
    }

    fn visible_coupon(
        &mut self,
        vendor: VendorId,
        id: CouponId,
    ) -> Result<&mut Coupon, BackendError> {
        let store = self.coupons.get(&id).map(|c| c.store_id);
        match store {
            Some(store) if self.owns(vendor, store) => self
                .coupons
                .get_mut(&id)
                .ok_or_else(|| BackendError::NotFound(format!("coupons {id}"))),
            _ => Err(BackendError::NotFound(format!("coupons {id}"))),
        }
    }

    fn code_taken(&self, store: StoreId, code: &str, except: Option<CouponId>) -> bool {
        self.coupons
            .values()
            .any(|c| c.store_id == store && c.code == code && Some(c.id) != except)
    }

    /// Orders counted by the reports: not cancelled, inside the day window.
    fn reportable_orders(&self, store: StoreId, days: Option<u32>) -> Vec<&Order> {
        let since = days.map(|d| Utc::now() - Duration::days(i64::from(d)));
        self.orders
            .values()
            .filter(|o| o.store_id == store && o.status != DeliveryStatus::Cancelled)
            .filter(|o| since.is_none_or(|since| o.created_at >= since))
            .collect()
    }
}

fn duplicate_code() -> BackendError {
    BackendError::Api {
        status: 409,
        message: "duplicate key value violates unique constraint \"coupons_store_id_code_key\""
            .to_string(),
    }
}

fn count_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// In-memory backend.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
    calls: AtomicUsize,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of [`Backend`] calls served so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Register a user that can sign in with `password`.
    pub async fn register_user(&self, email: &Email, password: &str) -> VendorId {
        let id = VendorId::random();
        self.state.write().await.users.insert(
            email.clone(),
            MemoryUser {
                id,
                email: email.clone(),
                password: password.to_string(),
            },
        );
        id
    }

    /// Issue a token for `user` without a password round-trip.
    pub async fn issue_token(&self, user: VendorId) -> AccessToken {
        let token = Uuid::new_v4().to_string();
        self.state
            .write()
            .await
            .sessions
            .insert(token.clone(), user);
        AccessToken::new(token)
    }

    pub async fn seed_store(&self, store: Store) {
        self.state.write().await.stores.insert(store.id, store);
    }

    pub async fn seed_product(&self, product: Product) {
        self.state.write().await.products.insert(product.id, product);
    }

    pub async fn seed_order(&self, order: Order) {
        self.state.write().await.orders.insert(order.id, order);
    }

    pub async fn seed_review(&self, review: Review) {
        self.state.write().await.reviews.insert(review.id, review);
    }

    pub async fn seed_notification(&self, notification: Notification) {
        self.state
            .write()
            .await
            .notifications
            .insert(notification.id, notification);
    }

    /// Read an order straight from storage, ignoring visibility rules.
    pub async fn stored_order(&self, id: OrderId) -> Option<Order> {
        self.state.read().await.orders.get(&id).cloned()
    }

    /// Every notification addressed to `user`, ignoring visibility rules.
    pub async fn stored_notifications(&self, user: Uuid) -> Vec<Notification> {
        self.state
            .read()
            .await
            .notifications
            .values()
            .filter(|n| n.user_id == user)
            .cloned()
            .collect()
    }

    pub async fn stored_object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.state
            .read()
            .await
            .objects
            .get(&format!("{bucket}/{path}"))
            .cloned()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let (id, email) = state
            .users
            .get(email)
            .filter(|u| u.password == password)
            .map(|u| (u.id, u.email.clone()))
            .ok_or_else(|| BackendError::Unauthorized("Invalid login credentials".to_string()))?;

        let token = Uuid::new_v4().to_string();
        state.sessions.insert(token.clone(), id);
        Ok(AuthSession {
            access_token: AccessToken::new(token),
            expires_in: TOKEN_TTL_SECONDS,
            user: AuthUser { id, email },
        })
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        state.user(token)?;
        state.sessions.remove(token.expose());
        Ok(())
    }

    async fn list_stores(
        &self,
        token: &AccessToken,
        vendor: VendorId,
    ) -> Result<Vec<Store>, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        let mut stores: Vec<Store> = state
            .stores
            .values()
            .filter(|s| s.vendor_id == vendor && s.vendor_id == user)
            .cloned()
            .collect();
        stores.sort_by_key(|s| s.created_at);
        Ok(stores)
    }

    async fn get_store(&self, token: &AccessToken, id: StoreId) -> Result<Store, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        state.owned_store(user, id).cloned()
    }

    async fn create_store(
        &self,
        token: &AccessToken,
        store: &NewStore,
    ) -> Result<Store, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        if store.vendor_id != user {
            return Err(BackendError::Api {
                status: 403,
                message: "new row violates row-level security policy for table \"stores\""
                    .to_string(),
            });
        }

        let now = Utc::now();
        let row = Store {
            id: StoreId::random(),
            vendor_id: store.vendor_id,
            name: store.name.clone(),
            description: store.description.clone(),
            status: store.status,
            logo_url: None,
            banner_url: None,
            address: store.address.clone(),
            latitude: store.latitude,
            longitude: store.longitude,
            categories: store.categories.clone(),
            social_links: store.social_links.clone(),
            created_at: now,
            updated_at: now,
        };
        state.stores.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_store(
        &self,
        token: &AccessToken,
        id: StoreId,
        update: &StoreUpdate,
    ) -> Result<Store, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        state.owned_store(user, id)?;
        let store = state
            .stores
            .get_mut(&id)
            .ok_or_else(|| BackendError::NotFound(format!("stores {id}")))?;
        store.apply(update.clone());
        store.updated_at = Utc::now();
        Ok(store.clone())
    }

    async fn list_products(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Product>, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        if !state.owns(user, store) {
            return Ok(Vec::new());
        }
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.store_id == store)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn get_product(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<Product, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        state.visible_product(user, id).map(|p| p.clone())
    }

    async fn create_product(
        &self,
        token: &AccessToken,
        product: &NewProduct,
    ) -> Result<Product, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        state.owned_store(user, product.store_id)?;

        let now = Utc::now();
        let row = Product {
            id: ProductId::random(),
            store_id: product.store_id,
            name: product.name.clone(),
            short_description: product.short_description.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price,
            cost_price: product.cost_price,
            stock: product.stock,
            image_url: None,
            is_active: product.is_active,
            length_cm: product.length_cm,
            width_cm: product.width_cm,
            height_cm: product.height_cm,
            weight_kg: product.weight_kg,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_product(
        &self,
        token: &AccessToken,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        let product = state.visible_product(user, id)?;
        product.apply(update.clone());
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<(), BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        state.visible_product(user, id)?;
        state.products.remove(&id);
        Ok(())
    }

    async fn list_orders(
        &self,
        token: &AccessToken,
        store: StoreId,
        statuses: &[DeliveryStatus],
    ) -> Result<Vec<Order>, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        if !state.owns(user, store) {
            return Ok(Vec::new());
        }
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.store_id == store)
            .filter(|o| statuses.is_empty() || statuses.contains(&o.status))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn get_order(&self, token: &AccessToken, id: OrderId) -> Result<Order, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        state.visible_order(user, id).map(|o| o.clone())
    }

    async fn update_order_status(
        &self,
        token: &AccessToken,
        id: OrderId,
        status: DeliveryStatus,
    ) -> Result<Order, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        let order = state.visible_order(user, id)?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn update_delivery_details(
        &self,
        token: &AccessToken,
        id: OrderId,
        update: &DeliveryDetailsUpdate,
    ) -> Result<Order, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        let order = state.visible_order(user, id)?;
        order.apply(update.clone());
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn list_coupons(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Coupon>, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        if !state.owns(user, store) {
            return Ok(Vec::new());
        }
        let mut coupons: Vec<Coupon> = state
            .coupons
            .values()
            .filter(|c| c.store_id == store)
            .cloned()
            .collect();
        coupons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(coupons)
    }

    async fn create_coupon(
        &self,
        token: &AccessToken,
        coupon: &NewCoupon,
    ) -> Result<Coupon, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        state.owned_store(user, coupon.store_id)?;
        if state.code_taken(coupon.store_id, &coupon.code, None) {
            return Err(duplicate_code());
        }

        let row = Coupon {
            id: CouponId::random(),
            store_id: coupon.store_id,
            code: coupon.code.clone(),
            discount_type: coupon.discount_type,
            value: coupon.value,
            min_spend: coupon.min_spend,
            usage_limit: coupon.usage_limit,
            usage_count: 0,
            is_active: coupon.is_active,
            starts_at: coupon.starts_at,
            ends_at: coupon.ends_at,
            created_at: Utc::now(),
        };
        state.coupons.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_coupon(
        &self,
        token: &AccessToken,
        id: CouponId,
        update: &CouponUpdate,
    ) -> Result<Coupon, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        let store = state.visible_coupon(user, id)?.store_id;
        if let Some(code) = &update.code {
            if state.code_taken(store, code, Some(id)) {
                return Err(duplicate_code());
            }
        }
        let coupon = state.visible_coupon(user, id)?;
        coupon.apply(update.clone());
        Ok(coupon.clone())
    }

    async fn delete_coupon(&self, token: &AccessToken, id: CouponId) -> Result<(), BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        state.visible_coupon(user, id)?;
        state.coupons.remove(&id);
        Ok(())
    }

    async fn list_reviews(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Review>, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        if !state.owns(user, store) {
            return Ok(Vec::new());
        }
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| r.store_id == store)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn reply_to_review(
        &self,
        token: &AccessToken,
        id: ReviewId,
        reply: &str,
    ) -> Result<Review, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let user = state.user(token)?;
        let store = state.reviews.get(&id).map(|r| r.store_id);
        if !store.is_some_and(|s| state.owns(user, s)) {
            return Err(BackendError::NotFound(format!("reviews {id}")));
        }
        let review = state
            .reviews
            .get_mut(&id)
            .ok_or_else(|| BackendError::NotFound(format!("reviews {id}")))?;
        review.reply = Some(reply.to_string());
        review.replied_at = Some(Utc::now());
        Ok(review.clone())
    }

    async fn list_notifications(
        &self,
        token: &AccessToken,
        user: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let caller = state.user(token)?;
        if caller.as_uuid() != user {
            return Ok(Vec::new());
        }
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.user_id == user && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn create_notification(
        &self,
        token: &AccessToken,
        notification: &NewNotification,
    ) -> Result<Notification, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        state.user(token)?;
        let row = Notification {
            id: NotificationId::random(),
            user_id: notification.user_id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            kind: notification.kind,
            is_read: false,
            link: notification.link.clone(),
            created_at: Utc::now(),
        };
        state.notifications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn mark_notification_read(
        &self,
        token: &AccessToken,
        id: NotificationId,
    ) -> Result<Notification, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let caller = state.user(token)?;
        let notification = state
            .notifications
            .get_mut(&id)
            .filter(|n| n.user_id == caller.as_uuid())
            .ok_or_else(|| BackendError::NotFound(format!("notifications {id}")))?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    async fn mark_all_notifications_read(
        &self,
        token: &AccessToken,
        user: Uuid,
    ) -> Result<usize, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        let caller = state.user(token)?;
        if caller.as_uuid() != user {
            return Ok(0);
        }
        let mut changed = 0;
        for notification in state.notifications.values_mut() {
            if notification.user_id == user && !notification.is_read {
                notification.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn revenue_summary(
        &self,
        token: &AccessToken,
        store: StoreId,
        days: Option<u32>,
    ) -> Result<RevenueSummary, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        state.owned_store(user, store)?;

        let orders = state.reportable_orders(store, days);
        let total_revenue: Decimal = orders.iter().map(|o| o.total).sum();
        let total_cost: Decimal = orders
            .iter()
            .flat_map(|o| &o.items)
            .map(|item| {
                let unit_cost = item
                    .product_id
                    .and_then(|id| state.products.get(&id))
                    .and_then(|p| p.cost_price)
                    .unwrap_or(Decimal::ZERO);
                unit_cost * Decimal::from(item.quantity)
            })
            .sum();
        let average_order_value = if orders.is_empty() {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(orders.len())).round_dp(2)
        };

        Ok(RevenueSummary {
            total_revenue,
            total_cost,
            total_orders: count_i64(orders.len()),
            average_order_value,
        })
    }

    async fn monthly_revenue(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<MonthlyRevenue>, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        state.owned_store(user, store)?;

        let mut months: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for order in state.reportable_orders(store, None) {
            let entry = months
                .entry(order.created_at.format("%Y-%m").to_string())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += order.total;
            entry.1 += 1;
        }
        Ok(months
            .into_iter()
            .map(|(month, (revenue, orders))| MonthlyRevenue {
                month,
                revenue,
                orders,
            })
            .collect())
    }

    async fn top_products(
        &self,
        token: &AccessToken,
        store: StoreId,
        days: Option<u32>,
        limit: u32,
    ) -> Result<Vec<TopProduct>, BackendError> {
        self.record_call();
        let state = self.state.read().await;
        let user = state.user(token)?;
        state.owned_store(user, store)?;

        let mut totals: HashMap<ProductId, TopProduct> = HashMap::new();
        for item in state
            .reportable_orders(store, days)
            .into_iter()
            .flat_map(|o| &o.items)
        {
            let Some(product_id) = item.product_id else {
                continue;
            };
            let entry = totals.entry(product_id).or_insert_with(|| TopProduct {
                product_id,
                product_name: item.product_name.clone(),
                units_sold: 0,
                revenue: Decimal::ZERO,
            });
            entry.units_sold += i64::from(item.quantity);
            entry.revenue += item.line_total();
        }

        let mut ranked: Vec<TopProduct> = totals.into_values().collect();
        ranked.sort_by(|a, b| {
            b.units_sold
                .cmp(&a.units_sold)
                .then_with(|| b.revenue.cmp(&a.revenue))
        });
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }

    async fn upload_object(
        &self,
        token: &AccessToken,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        self.record_call();
        let mut state = self.state.write().await;
        state.user(token)?;
        state.objects.insert(
            format!("{bucket}/{path}"),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(format!("{PUBLIC_STORAGE_BASE}/{bucket}/{path}"))
    }
}
