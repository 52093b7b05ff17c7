use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{ProductId, RuntimePlatform, Store};
use crate::simulated::{SimulatedStore, SimulatedStoreConfig};
use crate::store::PurchasingModule;
use crate::unavailable::UnavailableStore;

/// Backend selected when the application does not inject its own store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreBackend {
  #[default]
  Unavailable,
  Simulated,
}

/// Plugin configuration, read from `plugins.purchase` in the Tauri config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
  #[serde(default = "default_auto_initialize")]
  pub auto_initialize: bool,
  #[serde(default)]
  pub store: StoreBackend,
  #[serde(default)]
  pub platform: RuntimePlatform,
  /// Per-product SKU overrides merged over the built-in catalog.
  #[serde(default)]
  pub store_ids: HashMap<ProductId, BTreeMap<Store, String>>,
  #[serde(default)]
  pub simulated: SimulatedStoreConfig,
}

fn default_auto_initialize() -> bool {
  true
}

impl Default for Config {
  fn default() -> Self {
    Self {
      auto_initialize: default_auto_initialize(),
      store: StoreBackend::default(),
      platform: RuntimePlatform::default(),
      store_ids: HashMap::new(),
      simulated: SimulatedStoreConfig::default(),
    }
  }
}

impl Config {
  pub fn purchasing_module(&self) -> Arc<dyn PurchasingModule> {
    match self.store {
      StoreBackend::Unavailable => Arc::new(UnavailableStore),
      StoreBackend::Simulated => Arc::new(SimulatedStore::new(self.platform, self.simulated.clone())),
    }
  }
}
