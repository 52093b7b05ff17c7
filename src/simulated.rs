//! In-memory store used when no device storefront is available.
//!
//! Purchases always succeed unless configured otherwise, receipts are kept in
//! memory, and consumables lose their receipt once the purchase is completed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::*;
use crate::store::*;

/// Failure modes and starting inventory of the simulated store.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulatedStoreConfig {
    pub fail_initialization: Option<InitializationFailureReason>,
    pub fail_purchases: Option<PurchaseFailureReason>,
    pub unavailable: Vec<ProductId>,
    pub owned: Vec<ProductId>,
}

/// When listener callbacks run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Delivery {
    /// Right after the request returns control to the store.
    #[default]
    Immediate,
    /// On the next [`SimulatedStore::flush`].
    Queued,
}

type Callback = Box<dyn FnOnce(&dyn StoreListener) + Send>;

struct Inner {
    platform: RuntimePlatform,
    config: SimulatedStoreConfig,
    delivery: Delivery,
    listener: RwLock<Option<Weak<dyn StoreListener>>>,
    products: RwLock<Vec<StoreProduct>>,
    queue: Mutex<VecDeque<Callback>>,
    next_transaction: AtomicU64,
}

impl Inner {
    fn dispatch(&self, callback: Callback) {
        match self.delivery {
            Delivery::Immediate => self.deliver(callback),
            Delivery::Queued => self
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(callback),
        }
    }

    fn deliver(&self, callback: Callback) {
        let listener = self
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade);
        match listener {
            Some(listener) => callback(&*listener),
            None => debug!("simulated store callback dropped: listener gone"),
        }
    }

    fn products(&self) -> Vec<StoreProduct> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update<T>(&self, id: &str, f: impl FnOnce(&mut StoreProduct) -> T) -> Option<T> {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_mut()
            .find(|product| product.definition.id == id)
            .map(f)
    }

    fn next_receipt(&self, product: &StoreProduct) -> String {
        let transaction = self.next_transaction.fetch_add(1, Ordering::Relaxed) + 1;
        format!("simulated:{}:{transaction}", product.store_specific_id)
    }

    /// Consumes a consumable once the application has handled it.
    fn finish_transaction(&self, id: &str) {
        self.update(id, |product| {
            if product.definition.product_type == ProductType::Consumable {
                product.receipt = None;
            }
        });
    }
}

/// A [`PurchasingModule`] that never leaves the process.
#[derive(Clone)]
pub struct SimulatedStore {
    inner: Arc<Inner>,
}

impl SimulatedStore {
    pub fn new(platform: RuntimePlatform, config: SimulatedStoreConfig) -> Self {
        Self::with_delivery(platform, config, Delivery::Immediate)
    }

    pub fn with_delivery(platform: RuntimePlatform, config: SimulatedStoreConfig, delivery: Delivery) -> Self {
        Self {
            inner: Arc::new(Inner {
                platform,
                config,
                delivery,
                listener: RwLock::new(None),
                products: RwLock::new(Vec::new()),
                queue: Mutex::new(VecDeque::new()),
                next_transaction: AtomicU64::new(0),
            }),
        }
    }

    /// Runs queued callbacks, including ones queued while flushing.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self
                .inner
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(callback) = next else {
                return delivered;
            };
            self.inner.deliver(callback);
            delivered += 1;
        }
    }

    pub fn products(&self) -> Vec<StoreProduct> {
        self.inner.products()
    }
}

impl PurchasingModule for SimulatedStore {
    fn initialize(&self, listener: Weak<dyn StoreListener>, products: Vec<ProductDefinition>) {
        *self
            .inner
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(listener);

        if let Some(reason) = self.inner.config.fail_initialization {
            self.inner
                .dispatch(Box::new(move |listener: &dyn StoreListener| listener.on_initialize_failed(reason)));
            return;
        }
        if products.is_empty() {
            self.inner.dispatch(Box::new(|listener: &dyn StoreListener| {
                listener.on_initialize_failed(InitializationFailureReason::NoProductsAvailable)
            }));
            return;
        }

        let store = self.inner.platform.store();
        let records: Vec<StoreProduct> = products
            .into_iter()
            .map(|definition| {
                let id = definition.id.parse::<ProductId>().ok();
                let mut product = StoreProduct {
                    store_specific_id: definition.store_specific_id(store).to_string(),
                    available_to_purchase: id.map_or(true, |id| !self.inner.config.unavailable.contains(&id)),
                    receipt: None,
                    definition,
                };
                if id.is_some_and(|id| self.inner.config.owned.contains(&id)) {
                    product.receipt = Some(self.inner.next_receipt(&product));
                }
                product
            })
            .collect();
        *self
            .inner
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner) = records;

        let controller: Arc<dyn StoreController> = Arc::new(SimulatedController {
            inner: self.inner.clone(),
        });
        let extensions: Arc<dyn ExtensionProvider> = Arc::new(SimulatedExtensions {
            inner: self.inner.clone(),
        });
        self.inner.dispatch(Box::new(move |listener: &dyn StoreListener| {
            listener.on_initialized(controller, extensions)
        }));
    }
}

struct SimulatedController {
    inner: Arc<Inner>,
}

impl StoreController for SimulatedController {
    fn products(&self) -> Vec<StoreProduct> {
        self.inner.products()
    }

    fn initiate_purchase(&self, product: &StoreProduct) {
        let id = product.definition.id.clone();
        let failure = match self.inner.config.fail_purchases {
            Some(reason) => Some(reason),
            None => self.inner.update(&id, |record| {
                if !record.available_to_purchase {
                    Some(PurchaseFailureReason::ProductUnavailable)
                } else if record.definition.product_type.is_durable() && record.has_receipt() {
                    Some(PurchaseFailureReason::DuplicateTransaction)
                } else {
                    record.receipt = Some(self.inner.next_receipt(record));
                    None
                }
            })
            .unwrap_or(Some(PurchaseFailureReason::ProductUnavailable)),
        };

        if let Some(reason) = failure {
            let product = product.clone();
            self.inner
                .dispatch(Box::new(move |listener: &dyn StoreListener| listener.on_purchase_failed(product, reason)));
            return;
        }

        let inner = self.inner.clone();
        self.inner.dispatch(Box::new(move |listener: &dyn StoreListener| {
            let Some(purchased_product) = inner.products().into_iter().find(|p| p.definition.id == id) else {
                return;
            };
            let result = listener.process_purchase(PurchaseEvent { purchased_product });
            if result == PurchaseProcessingResult::Complete {
                inner.finish_transaction(&id);
            }
        }));
    }

    fn confirm_pending_purchase(&self, product: &StoreProduct) {
        self.inner.finish_transaction(&product.definition.id);
    }
}

struct SimulatedExtensions {
    inner: Arc<Inner>,
}

impl ExtensionProvider for SimulatedExtensions {
    fn transaction_restorer(&self) -> Option<Arc<dyn TransactionRestorer>> {
        match self.inner.platform {
            RuntimePlatform::IPhonePlayer | RuntimePlatform::OsxPlayer => Some(Arc::new(SimulatedRestorer {
                inner: self.inner.clone(),
            })),
            RuntimePlatform::Android | RuntimePlatform::Desktop => None,
        }
    }
}

struct SimulatedRestorer {
    inner: Arc<Inner>,
}

impl TransactionRestorer for SimulatedRestorer {
    fn restore_transactions(&self, on_complete: RestoreCallback) {
        let inner = self.inner.clone();
        self.inner.dispatch(Box::new(move |listener: &dyn StoreListener| {
            for purchased_product in inner
                .products()
                .into_iter()
                .filter(|p| p.definition.product_type.is_durable() && p.has_receipt())
            {
                listener.process_purchase(PurchaseEvent { purchased_product });
            }
            on_complete(true);
        }));
    }
}
