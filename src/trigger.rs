use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::ProductId;

/// What a [`PurchaseTrigger`] needs from the purchasing service.
pub trait PurchaseService {
    fn purchase(&self, product_id: &str);

    fn has_purchased(&self, product_id: &str) -> bool;
}

/// UI-bound adapter for a single product, e.g. a shop button.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTrigger {
    product_id: String,
}

impl PurchaseTrigger {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Buys the product unless it is a durable good that is already owned.
    pub fn activate<S: PurchaseService + ?Sized>(&self, service: &S) {
        let durable = self
            .product_id
            .parse::<ProductId>()
            .map(|id| id.product_type().is_durable())
            .unwrap_or(false);

        if durable && service.has_purchased(&self.product_id) {
            info!("{} already purchased", self.product_id);
            return;
        }

        service.purchase(&self.product_id);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;

    use super::*;

    #[derive(Default)]
    struct FakeService {
        owned: HashSet<String>,
        purchases: RefCell<Vec<String>>,
        ownership_checks: RefCell<Vec<String>>,
    }

    impl FakeService {
        fn owning(ids: &[&str]) -> Self {
            Self {
                owned: ids.iter().map(|id| id.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl PurchaseService for FakeService {
        fn purchase(&self, product_id: &str) {
            self.purchases.borrow_mut().push(product_id.to_string());
        }

        fn has_purchased(&self, product_id: &str) -> bool {
            self.ownership_checks.borrow_mut().push(product_id.to_string());
            self.owned.contains(product_id)
        }
    }

    #[test]
    fn owned_durable_products_are_not_bought_again() {
        let service = FakeService::owning(&["character_skin", "premium_subscription"]);

        PurchaseTrigger::new("character_skin").activate(&service);
        PurchaseTrigger::new("premium_subscription").activate(&service);

        assert!(service.purchases.borrow().is_empty());
    }

    #[test]
    fn durable_products_not_yet_owned_are_bought() {
        let service = FakeService::default();

        PurchaseTrigger::new("character_skin").activate(&service);

        assert_eq!(*service.ownership_checks.borrow(), vec!["character_skin"]);
        assert_eq!(*service.purchases.borrow(), vec!["character_skin"]);
    }

    #[test]
    fn consumables_are_always_bought() {
        let service = FakeService::owning(&["heart"]);
        let trigger = PurchaseTrigger::new("heart");

        trigger.activate(&service);
        trigger.activate(&service);

        assert!(service.ownership_checks.borrow().is_empty());
        assert_eq!(*service.purchases.borrow(), vec!["heart", "heart"]);
    }

    #[test]
    fn unknown_products_are_forwarded_to_the_service() {
        let service = FakeService::owning(&["gold"]);

        PurchaseTrigger::new("gold").activate(&service);

        assert_eq!(*service.purchases.borrow(), vec!["gold"]);
    }

    #[test]
    fn triggers_deserialize_from_ui_payloads() {
        let trigger: PurchaseTrigger =
            serde_json::from_value(serde_json::json!({ "productId": "heart" })).unwrap();
        assert_eq!(trigger.product_id(), "heart");
    }
}
