//! Store fakes for unit tests.

use std::sync::{Arc, Mutex, Weak};

use crate::models::*;
use crate::store::*;

/// A store whose callbacks fire only when the test says so.
pub struct RecordingStore {
  controller: Arc<RecordingController>,
  listener: Mutex<Option<Weak<dyn StoreListener>>>,
  registered: Mutex<Vec<ProductDefinition>>,
  initialize_calls: Mutex<usize>,
  restore_enabled: Mutex<bool>,
  restorer: Arc<RecordingRestorer>,
}

impl RecordingStore {
  pub fn new() -> Self {
    Self {
      controller: Arc::new(RecordingController::default()),
      listener: Mutex::new(None),
      registered: Mutex::new(Vec::new()),
      initialize_calls: Mutex::new(0),
      restore_enabled: Mutex::new(false),
      restorer: Arc::new(RecordingRestorer::default()),
    }
  }

  fn listener(&self) -> Option<Arc<dyn StoreListener>> {
    self.listener.lock().unwrap().as_ref().and_then(Weak::upgrade)
  }

  pub fn controller(&self) -> Arc<RecordingController> {
    self.controller.clone()
  }

  pub fn registered_products(&self) -> Vec<ProductDefinition> {
    self.registered.lock().unwrap().clone()
  }

  pub fn initialize_calls(&self) -> usize {
    *self.initialize_calls.lock().unwrap()
  }

  pub fn restore_calls(&self) -> usize {
    *self.restorer.calls.lock().unwrap()
  }

  pub fn enable_restore(&self) {
    *self.restore_enabled.lock().unwrap() = true;
  }

  pub fn succeed(&self) {
    let extensions = Arc::new(RecordingExtensions {
      restorer: self
        .restore_enabled
        .lock()
        .unwrap()
        .then(|| self.restorer.clone()),
    });
    if let Some(listener) = self.listener() {
      listener.on_initialized(self.controller.clone(), extensions);
    }
  }

  pub fn fail(&self, reason: InitializationFailureReason) {
    if let Some(listener) = self.listener() {
      listener.on_initialize_failed(reason);
    }
  }

  pub fn complete_purchase(&self, id: &str) -> Option<PurchaseProcessingResult> {
    let product = self.controller.product(id)?;
    let listener = self.listener()?;
    Some(listener.process_purchase(PurchaseEvent {
      purchased_product: product,
    }))
  }
}

impl PurchasingModule for RecordingStore {
  fn initialize(&self, listener: Weak<dyn StoreListener>, products: Vec<ProductDefinition>) {
    *self.initialize_calls.lock().unwrap() += 1;
    *self.listener.lock().unwrap() = Some(listener);
    *self.controller.products.lock().unwrap() = products
      .iter()
      .map(|definition| StoreProduct {
        definition: definition.clone(),
        store_specific_id: definition.id.clone(),
        available_to_purchase: true,
        receipt: None,
      })
      .collect();
    *self.registered.lock().unwrap() = products;
  }
}

#[derive(Default)]
pub struct RecordingController {
  products: Mutex<Vec<StoreProduct>>,
  purchase_requests: Mutex<Vec<String>>,
}

impl RecordingController {
  pub fn purchase_requests(&self) -> Vec<String> {
    self.purchase_requests.lock().unwrap().clone()
  }

  pub fn set_receipt(&self, id: &str, receipt: Option<&str>) {
    self.update(id, |product| product.receipt = receipt.map(str::to_string));
  }

  pub fn set_available(&self, id: &str, available: bool) {
    self.update(id, |product| product.available_to_purchase = available);
  }

  fn update(&self, id: &str, f: impl Fn(&mut StoreProduct)) {
    let mut products = self.products.lock().unwrap();
    products
      .iter_mut()
      .filter(|product| product.definition.id == id)
      .for_each(f);
  }
}

impl StoreController for RecordingController {
  fn products(&self) -> Vec<StoreProduct> {
    self.products.lock().unwrap().clone()
  }

  fn initiate_purchase(&self, product: &StoreProduct) {
    self
      .purchase_requests
      .lock()
      .unwrap()
      .push(product.definition.id.clone());
  }

  fn confirm_pending_purchase(&self, _product: &StoreProduct) {}
}

struct RecordingExtensions {
  restorer: Option<Arc<RecordingRestorer>>,
}

impl ExtensionProvider for RecordingExtensions {
  fn transaction_restorer(&self) -> Option<Arc<dyn TransactionRestorer>> {
    self
      .restorer
      .clone()
      .map(|restorer| restorer as Arc<dyn TransactionRestorer>)
  }
}

#[derive(Default)]
struct RecordingRestorer {
  calls: Mutex<usize>,
}

impl TransactionRestorer for RecordingRestorer {
  fn restore_transactions(&self, on_complete: RestoreCallback) {
    *self.calls.lock().unwrap() += 1;
    on_complete(true);
  }
}
