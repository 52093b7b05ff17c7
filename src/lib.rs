use std::sync::Arc;

use tauri::{
  plugin::{Builder as PluginBuilder, TauriPlugin},
  Manager, Runtime,
};
use tracing::warn;

pub use models::*;

mod catalog;
mod commands;
mod config;
mod coordinator;
mod error;
mod models;
mod simulated;
mod store;
mod trigger;
mod unavailable;

#[cfg(test)]
mod test_support;

pub use catalog::{build_catalog, default_catalog};
pub use config::{Config, StoreBackend};
pub use coordinator::PurchaseCoordinator;
pub use error::{Error, Result};
pub use simulated::{Delivery, SimulatedStore, SimulatedStoreConfig};
pub use store::{
  ExtensionProvider, PurchasingModule, RestoreCallback, StoreController, StoreListener, TransactionRestorer,
};
pub use trigger::{PurchaseService, PurchaseTrigger};
pub use unavailable::UnavailableStore;

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`] to access the purchase APIs.
pub trait PurchaseExt<R: Runtime> {
  fn purchases(&self) -> &Arc<PurchaseCoordinator>;
}

impl<R: Runtime, T: Manager<R>> crate::PurchaseExt<R> for T {
  fn purchases(&self) -> &Arc<PurchaseCoordinator> {
    self.state::<Arc<PurchaseCoordinator>>().inner()
  }
}

/// Plugin builder, for applications that bring their own store backend.
#[derive(Default)]
pub struct Builder {
  store: Option<Arc<dyn PurchasingModule>>,
}

impl Builder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Uses `store` instead of the backend named in the plugin config.
  pub fn store(mut self, store: Arc<dyn PurchasingModule>) -> Self {
    self.store = Some(store);
    self
  }

  pub fn build<R: Runtime>(self) -> TauriPlugin<R, Option<Config>> {
    let store = self.store;
    PluginBuilder::<R, Option<Config>>::new("purchase")
      .invoke_handler(tauri::generate_handler![
        commands::initialize,
        commands::is_initialized,
        commands::get_status,
        commands::purchase,
        commands::restore_purchase,
        commands::has_purchased,
        commands::activate,
      ])
      .setup(move |app, api| {
        let config = api.config().clone().unwrap_or_default();
        register_coordinator(&config, store, |coordinator| app.manage(coordinator));
        Ok(())
      })
      .build()
  }
}

/// Builds the coordinator, hands it to `manage`, and starts it if registration succeeded.
///
/// An injected `store` wins over the backend named in `config`. When `manage`
/// refuses the coordinator, the one registered earlier stays in charge.
fn register_coordinator(
  config: &Config,
  store: Option<Arc<dyn PurchasingModule>>,
  manage: impl FnOnce(Arc<PurchaseCoordinator>) -> bool,
) -> Option<Arc<PurchaseCoordinator>> {
  let module = store.unwrap_or_else(|| config.purchasing_module());
  let coordinator = Arc::new(PurchaseCoordinator::new(module, build_catalog(&config.store_ids)));

  if !manage(coordinator.clone()) {
    warn!("purchase coordinator already registered, keeping the existing one");
    return None;
  }
  if config.auto_initialize {
    coordinator.initialize();
  }
  Some(coordinator)
}

/// Initializes the plugin with the store backend named in the plugin config.
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<Config>> {
  Builder::new().build()
}
