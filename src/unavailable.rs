use std::sync::Weak;

use tracing::debug;

use crate::models::*;
use crate::store::{PurchasingModule, StoreListener};

/// Store backend for builds without a device storefront.
///
/// Initialization always fails with [`InitializationFailureReason::PurchasingUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl PurchasingModule for UnavailableStore {
  fn initialize(&self, listener: Weak<dyn StoreListener>, products: Vec<ProductDefinition>) {
    debug!("no store available for {} products", products.len());
    if let Some(listener) = listener.upgrade() {
      listener.on_initialize_failed(InitializationFailureReason::PurchasingUnavailable);
    }
  }
}
