use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::info;

use crate::models::{OrderId, OrderPatch, OrderStatus};
use crate::notifier::NotifyOutcome;
use crate::validation::{self, OrderForm};
use crate::AppState;

pub const MSG_ORDER_CREATED: &str = "Pedido cadastrado com sucesso!";
pub const MSG_NO_ORDERS: &str = "Nenhum pedido cadastrado ainda.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateStatusPayload {
    #[serde(alias = "order_id", alias = "id")]
    pub order_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGetPayload {
    #[serde(alias = "order_id", alias = "id")]
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDeletePayload {
    #[serde(alias = "order_id", alias = "id")]
    pub order_id: String,
}

fn parse_order_id(raw: &str) -> Result<OrderId, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Missing orderId".into());
    }
    trimmed
        .parse()
        .map_err(|_| format!("ID de pedido inválido: {trimmed}"))
}

fn parse_status(raw: &str) -> Result<OrderStatus, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Missing status".into());
    }
    trimmed.parse().map_err(|_| {
        let known: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.label()).collect();
        format!("Status inválido '{trimmed}'. Use: {}", known.join(", "))
    })
}

/// Register an order from the form. Validation failures come back as
/// `success: false` with the offending fields; nothing is written.
pub fn order_create(
    state: &AppState,
    form: &OrderForm,
    now: NaiveDateTime,
) -> Result<serde_json::Value, String> {
    let order = match validation::validate(form, &state.catalog, now) {
        Ok(order) => order,
        Err(e) => {
            info!(fields = ?e.fields, "order form rejected");
            return Ok(serde_json::json!({
                "success": false,
                "message": e.message,
                "invalidFields": e.fields,
            }));
        }
    };

    state.store.append(order.clone()).map_err(|e| e.to_string())?;
    info!(order_id = %order.id, product = %order.product, quantity = order.quantity, "order created");

    let notification = state.notifier.order_created(&order);

    Ok(serde_json::json!({
        "success": true,
        "message": MSG_ORDER_CREATED,
        "order": order,
        "notification": notification,
    }))
}

pub fn order_get_all(state: &AppState) -> Result<serde_json::Value, String> {
    let orders = state.store.load().map_err(|e| e.to_string())?;
    if orders.is_empty() {
        return Ok(serde_json::json!({
            "success": true,
            "message": MSG_NO_ORDERS,
            "orders": [],
        }));
    }
    Ok(serde_json::json!({
        "success": true,
        "count": orders.len(),
        "orders": orders,
    }))
}

pub fn order_get(state: &AppState, payload: &OrderGetPayload) -> Result<serde_json::Value, String> {
    let order_id = parse_order_id(&payload.order_id)?;
    let order = state.store.find(order_id).map_err(|e| e.to_string())?;
    Ok(serde_json::json!({
        "success": true,
        "order": order,
    }))
}

/// Set a new status and notify the customer. The notice uses the name,
/// product and phone stored on the order.
pub fn order_update_status(
    state: &AppState,
    payload: &OrderUpdateStatusPayload,
) -> Result<serde_json::Value, String> {
    let order_id = parse_order_id(&payload.order_id)?;
    let status = parse_status(&payload.status)?;

    let previous = state
        .store
        .update(order_id, &OrderPatch::status(status))
        .map_err(|e| e.to_string())?;
    info!(
        order_id = %order_id,
        from = %previous.status,
        to = %status,
        "order status updated"
    );

    let notification: NotifyOutcome = state.notifier.status_changed(&previous, status);

    Ok(serde_json::json!({
        "success": true,
        "orderId": order_id,
        "previousStatus": previous.status,
        "status": status,
        "notification": notification,
    }))
}

pub fn order_delete(
    state: &AppState,
    payload: &OrderDeletePayload,
) -> Result<serde_json::Value, String> {
    let order_id = parse_order_id(&payload.order_id)?;
    let removed = state.store.delete(order_id).map_err(|e| e.to_string())?;
    info!(order_id = %order_id, name = %removed.name, "order deleted");

    Ok(serde_json::json!({
        "success": true,
        "orderId": order_id,
        "deleted": removed,
    }))
}
