use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tracing::{debug, error, info, warn};

use crate::models::*;
use crate::store::{ExtensionProvider, PurchasingModule, StoreController, StoreListener};
use crate::trigger::PurchaseService;

/// Both handles delivered by a successful initialization, kept together.
#[derive(Clone)]
struct StoreHandles {
    controller: Arc<dyn StoreController>,
    extensions: Arc<dyn ExtensionProvider>,
}

enum State {
    Uninitialized,
    Pending,
    Ready(StoreHandles),
    Failed(InitializationFailureReason),
}

/// Single access point to purchasing for the application.
///
/// Every operation is a silent no-op until the store reports a successful
/// initialization; failures only surface as log lines.
pub struct PurchaseCoordinator {
    module: Arc<dyn PurchasingModule>,
    catalog: Vec<ProductDefinition>,
    state: RwLock<State>,
}

impl PurchaseCoordinator {
    pub fn new(module: Arc<dyn PurchasingModule>, catalog: Vec<ProductDefinition>) -> Self {
        Self {
            module,
            catalog,
            state: RwLock::new(State::Uninitialized),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn handles(&self) -> Option<StoreHandles> {
        match &*self.read_state() {
            State::Ready(handles) => Some(handles.clone()),
            _ => None,
        }
    }

    pub fn catalog(&self) -> &[ProductDefinition] {
        &self.catalog
    }

    pub fn status(&self) -> InitializationStatus {
        match &*self.read_state() {
            State::Uninitialized => InitializationStatus::Uninitialized,
            State::Pending => InitializationStatus::Pending,
            State::Ready(_) => InitializationStatus::Ready,
            State::Failed(reason) => InitializationStatus::Failed { reason: *reason },
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(*self.read_state(), State::Ready(_))
    }

    /// Registers the catalog with the store. Only the first call has any effect.
    pub fn initialize(self: &Arc<Self>) {
        {
            let mut state = self.write_state();
            if !matches!(*state, State::Uninitialized) {
                debug!("purchasing already initialized or in progress");
                return;
            }
            *state = State::Pending;
        }

        info!("initializing purchasing with {} products", self.catalog.len());
        let weak: Weak<Self> = Arc::downgrade(self);
        let listener: Weak<dyn StoreListener> = weak;
        self.module.initialize(listener, self.catalog.clone());
    }

    pub fn purchase(&self, product_id: &str) {
        let Some(handles) = self.handles() else {
            debug!("purchase of {product_id} ignored: purchasing not initialized");
            return;
        };

        match handles.controller.product(product_id) {
            Some(product) if product.available_to_purchase => {
                info!("purchase requested: {}", product.definition.id);
                handles.controller.initiate_purchase(&product);
            }
            _ => info!("cannot purchase {product_id}: product unavailable"),
        }
    }

    /// Asks the platform to replay earlier durable purchases, where supported.
    pub fn restore_purchase(&self) {
        let Some(handles) = self.handles() else {
            debug!("restore ignored: purchasing not initialized");
            return;
        };
        let Some(restorer) = handles.extensions.transaction_restorer() else {
            debug!("restore not supported on this platform");
            return;
        };

        info!("restoring purchases");
        restorer.restore_transactions(Box::new(|result: bool| {
            info!("restore purchases finished: {result}");
        }));
    }

    /// Whether the store's cached record holds a receipt. No server validation.
    pub fn has_purchased(&self, product_id: &str) -> bool {
        let Some(handles) = self.handles() else {
            return false;
        };
        handles
            .controller
            .product(product_id)
            .map(|product| product.has_receipt())
            .unwrap_or(false)
    }
}

impl StoreListener for PurchaseCoordinator {
    fn on_initialized(&self, controller: Arc<dyn StoreController>, extensions: Arc<dyn ExtensionProvider>) {
        let mut state = self.write_state();
        if let State::Failed(reason) = *state {
            warn!("ignoring late initialization success after failure: {reason:?}");
            return;
        }
        info!("purchasing initialized");
        *state = State::Ready(StoreHandles {
            controller,
            extensions,
        });
    }

    fn on_initialize_failed(&self, reason: InitializationFailureReason) {
        error!("purchasing initialization failed: {reason:?}");
        *self.write_state() = State::Failed(reason);
    }

    fn process_purchase(&self, event: PurchaseEvent) -> PurchaseProcessingResult {
        let product = &event.purchased_product;
        info!("purchase succeeded: {}", product.definition.id);

        match product.definition.id.parse::<ProductId>() {
            Ok(id) => entitlement_handler(id)(product),
            Err(err) => warn!("no entitlement for purchased product: {err}"),
        }

        PurchaseProcessingResult::Complete
    }

    fn on_purchase_failed(&self, product: StoreProduct, reason: PurchaseFailureReason) {
        warn!("purchase failed: {}, {reason:?}", product.definition.id);
    }
}

impl PurchaseService for PurchaseCoordinator {
    fn purchase(&self, product_id: &str) {
        PurchaseCoordinator::purchase(self, product_id)
    }

    fn has_purchased(&self, product_id: &str) -> bool {
        PurchaseCoordinator::has_purchased(self, product_id)
    }
}

fn entitlement_handler(id: ProductId) -> fn(&StoreProduct) {
    match id {
        ProductId::Heart => grant_currency,
        ProductId::CharacterSkin => unlock_skin,
        ProductId::PremiumSubscription => activate_subscription,
    }
}

fn grant_currency(product: &StoreProduct) {
    info!("granting currency for {}", product.store_specific_id);
}

fn unlock_skin(product: &StoreProduct) {
    info!("unlocking skin for {}", product.store_specific_id);
}

fn activate_subscription(product: &StoreProduct) {
    info!("activating subscription for {}", product.store_specific_id);
}
