use tauri::{AppHandle, command, Runtime};

use crate::models::*;
use crate::trigger::PurchaseTrigger;
use crate::{PurchaseExt, Result};

#[command]
pub(crate) async fn initialize<R: Runtime>(
    app: AppHandle<R>,
) -> Result<StatusResponse> {
    let coordinator = app.purchases();
    coordinator.initialize();
    Ok(StatusResponse { status: coordinator.status() })
}

#[command]
pub(crate) async fn is_initialized<R: Runtime>(
    app: AppHandle<R>,
) -> Result<IsInitializedResponse> {
    Ok(IsInitializedResponse { initialized: app.purchases().is_initialized() })
}

#[command]
pub(crate) async fn get_status<R: Runtime>(
    app: AppHandle<R>,
) -> Result<StatusResponse> {
    Ok(StatusResponse { status: app.purchases().status() })
}

#[command]
pub(crate) async fn purchase<R: Runtime>(
    app: AppHandle<R>,
    payload: ProductRequest,
) -> Result<()> {
    app.purchases().purchase(&payload.product_id);
    Ok(())
}

#[command]
pub(crate) async fn restore_purchase<R: Runtime>(
    app: AppHandle<R>,
) -> Result<()> {
    app.purchases().restore_purchase();
    Ok(())
}

#[command]
pub(crate) async fn has_purchased<R: Runtime>(
    app: AppHandle<R>,
    payload: ProductRequest,
) -> Result<HasPurchasedResponse> {
    let purchased = app.purchases().has_purchased(&payload.product_id);
    Ok(HasPurchasedResponse { product_id: payload.product_id, purchased })
}

#[command]
pub(crate) async fn activate<R: Runtime>(
    app: AppHandle<R>,
    payload: PurchaseTrigger,
) -> Result<()> {
    payload.activate(&**app.purchases());
    Ok(())
}
