use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The products this application sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductId {
    /// In-game currency, bought repeatedly.
    Heart,
    /// Permanently unlocked character skin.
    CharacterSkin,
    /// Recurring premium access.
    PremiumSubscription,
}

impl ProductId {
    pub const ALL: [ProductId; 3] = [
        ProductId::Heart,
        ProductId::CharacterSkin,
        ProductId::PremiumSubscription,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductId::Heart => "heart",
            ProductId::CharacterSkin => "character_skin",
            ProductId::PremiumSubscription => "premium_subscription",
        }
    }

    pub fn product_type(&self) -> ProductType {
        match self {
            ProductId::Heart => ProductType::Consumable,
            ProductId::CharacterSkin => ProductType::NonConsumable,
            ProductId::PremiumSubscription => ProductType::Subscription,
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| Error::UnknownProduct(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductType {
    Consumable,
    NonConsumable,
    Subscription,
}

impl ProductType {
    /// Owned once bought, so a second purchase attempt is pointless.
    pub fn is_durable(&self) -> bool {
        matches!(self, ProductType::NonConsumable | ProductType::Subscription)
    }
}

/// Storefront a native SKU is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Store {
    AppleAppStore,
    GooglePlay,
}

/// Platform the application is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuntimePlatform {
    IPhonePlayer,
    OsxPlayer,
    Android,
    Desktop,
}

impl RuntimePlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            RuntimePlatform::IPhonePlayer
        } else if cfg!(target_os = "macos") {
            RuntimePlatform::OsxPlayer
        } else if cfg!(target_os = "android") {
            RuntimePlatform::Android
        } else {
            RuntimePlatform::Desktop
        }
    }

    /// The storefront serving this platform, if any.
    pub fn store(&self) -> Option<Store> {
        match self {
            RuntimePlatform::IPhonePlayer | RuntimePlatform::OsxPlayer => {
                Some(Store::AppleAppStore)
            }
            RuntimePlatform::Android => Some(Store::GooglePlay),
            RuntimePlatform::Desktop => None,
        }
    }
}

impl Default for RuntimePlatform {
    fn default() -> Self {
        RuntimePlatform::current()
    }
}

/// A catalog entry registered with the store abstraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDefinition {
    pub id: String,
    pub product_type: ProductType,
    #[serde(default)]
    pub store_ids: BTreeMap<Store, String>,
}

impl ProductDefinition {
    pub fn new(id: impl Into<String>, product_type: ProductType) -> Self {
        Self {
            id: id.into(),
            product_type,
            store_ids: BTreeMap::new(),
        }
    }

    pub fn with_store_id(mut self, store: Store, sku: impl Into<String>) -> Self {
        self.store_ids.insert(store, sku.into());
        self
    }

    /// Native SKU on `store`, falling back to the catalog id.
    pub fn store_specific_id(&self, store: Option<Store>) -> &str {
        store
            .and_then(|store| self.store_ids.get(&store))
            .map(String::as_str)
            .unwrap_or(&self.id)
    }
}

/// Product record cached by the store abstraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProduct {
    pub definition: ProductDefinition,
    pub store_specific_id: String,
    pub available_to_purchase: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

impl StoreProduct {
    pub fn has_receipt(&self) -> bool {
        self.receipt.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseEvent {
    pub purchased_product: StoreProduct,
}

/// Answer given to the store once a purchase has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseProcessingResult {
    /// The transaction is finished and may be consumed/acknowledged.
    Complete,
    /// The application will confirm later via `confirm_pending_purchase`.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InitializationFailureReason {
    PurchasingUnavailable,
    NoProductsAvailable,
    AppNotKnown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseFailureReason {
    PurchasingUnavailable,
    ExistingPurchasePending,
    ProductUnavailable,
    SignatureInvalid,
    UserCancelled,
    PaymentDeclined,
    DuplicateTransaction,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum InitializationStatus {
    Uninitialized,
    Pending,
    Ready,
    Failed { reason: InitializationFailureReason },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub product_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsInitializedResponse {
    pub initialized: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: InitializationStatus,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HasPurchasedResponse {
    pub product_id: String,
    pub purchased: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_ids_parse_from_catalog_strings() {
        assert_eq!("heart".parse::<ProductId>().unwrap(), ProductId::Heart);
        assert_eq!(
            "premium_subscription".parse::<ProductId>().unwrap(),
            ProductId::PremiumSubscription
        );
        assert!(matches!(
            "gold".parse::<ProductId>(),
            Err(Error::UnknownProduct(id)) if id == "gold"
        ));
    }

    #[test]
    fn only_skin_and_subscription_are_durable() {
        assert!(!ProductId::Heart.product_type().is_durable());
        assert!(ProductId::CharacterSkin.product_type().is_durable());
        assert!(ProductId::PremiumSubscription.product_type().is_durable());
    }

    #[test]
    fn store_specific_id_falls_back_to_catalog_id() {
        let definition = ProductDefinition::new("heart", ProductType::Consumable)
            .with_store_id(Store::GooglePlay, "com.example.heart");

        assert_eq!(
            definition.store_specific_id(Some(Store::GooglePlay)),
            "com.example.heart"
        );
        assert_eq!(definition.store_specific_id(Some(Store::AppleAppStore)), "heart");
        assert_eq!(definition.store_specific_id(None), "heart");
    }

    #[test]
    fn status_serializes_with_state_tag() {
        let json = serde_json::to_value(InitializationStatus::Failed {
            reason: InitializationFailureReason::AppNotKnown,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "state": "failed", "reason": "appNotKnown" })
        );
    }
}
