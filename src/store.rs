//! Boundary to the platform store abstraction.
//!
//! A [`PurchasingModule`] registers the catalog and later reports back through a
//! [`StoreListener`]. Once initialized it hands out a [`StoreController`] for
//! purchases and an [`ExtensionProvider`] for platform-specific capabilities.

use std::sync::{Arc, Weak};

use crate::models::*;

/// Callbacks the store abstraction invokes once an asynchronous request resolves.
pub trait StoreListener: Send + Sync {
  fn on_initialized(&self, controller: Arc<dyn StoreController>, extensions: Arc<dyn ExtensionProvider>);

  fn on_initialize_failed(&self, reason: InitializationFailureReason);

  fn process_purchase(&self, event: PurchaseEvent) -> PurchaseProcessingResult;

  fn on_purchase_failed(&self, product: StoreProduct, reason: PurchaseFailureReason);
}

/// Entry point of a store backend.
pub trait PurchasingModule: Send + Sync {
  /// Registers `products` and starts the asynchronous setup.
  ///
  /// The listener is held weakly; callbacks are dropped once it is gone.
  fn initialize(&self, listener: Weak<dyn StoreListener>, products: Vec<ProductDefinition>);
}

pub trait StoreController: Send + Sync {
  fn products(&self) -> Vec<StoreProduct>;

  fn product(&self, id: &str) -> Option<StoreProduct> {
    self.products().into_iter().find(|p| p.definition.id == id)
  }

  /// Starts the native purchase flow. The outcome arrives through the listener.
  fn initiate_purchase(&self, product: &StoreProduct);

  /// Finishes a purchase previously answered with [`PurchaseProcessingResult::Pending`].
  fn confirm_pending_purchase(&self, product: &StoreProduct);
}

/// Platform-specific capabilities. Absent capabilities return `None`.
pub trait ExtensionProvider: Send + Sync {
  fn transaction_restorer(&self) -> Option<Arc<dyn TransactionRestorer>> {
    None
  }
}

pub type RestoreCallback = Box<dyn FnOnce(bool) + Send>;

/// Re-fetches completed durable purchases (Apple storefronts).
pub trait TransactionRestorer: Send + Sync {
  fn restore_transactions(&self, on_complete: RestoreCallback);
}
