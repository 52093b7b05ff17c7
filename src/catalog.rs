use std::collections::{BTreeMap, HashMap};

use crate::models::{ProductDefinition, ProductId, Store};

const HEART_SKU: &str = "com.studio.app.heart";
const SKIN_SKU: &str = "com.studio.app.skin";
const PREMIUM_SUB_SKU: &str = "com.studio.app.sub";

fn default_sku(id: ProductId) -> &'static str {
  match id {
    ProductId::Heart => HEART_SKU,
    ProductId::CharacterSkin => SKIN_SKU,
    ProductId::PremiumSubscription => PREMIUM_SUB_SKU,
  }
}

/// The fixed product catalog, with the same SKU on every store.
pub fn default_catalog() -> Vec<ProductDefinition> {
  ProductId::ALL
    .into_iter()
    .map(|id| {
      ProductDefinition::new(id.as_str(), id.product_type())
        .with_store_id(Store::AppleAppStore, default_sku(id))
        .with_store_id(Store::GooglePlay, default_sku(id))
    })
    .collect()
}

/// Builds the catalog, replacing default SKUs with the configured ones.
pub fn build_catalog(overrides: &HashMap<ProductId, BTreeMap<Store, String>>) -> Vec<ProductDefinition> {
  let mut catalog = default_catalog();
  for definition in &mut catalog {
    let Ok(id) = definition.id.parse::<ProductId>() else {
      continue;
    };
    if let Some(store_ids) = overrides.get(&id) {
      for (store, sku) in store_ids {
        definition.store_ids.insert(*store, sku.clone());
      }
    }
  }
  catalog
}
