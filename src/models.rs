//! Order domain types shared by the store, validator, notifier and reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp layout of the `Data` column (day-first, local time).
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable order identifier persisted in the `ID` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Error returned when a stored or typed label matches no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Cartão")]
    Card,
    #[serde(rename = "Pix")]
    Pix,
}

impl PaymentMethod {
    /// Label written to the spreadsheet and shown to customers.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Card => "Cartão",
            PaymentMethod::Pix => "Pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cartão" | "cartao" | "card" => Ok(PaymentMethod::Card),
            "pix" => Ok(PaymentMethod::Pix),
            _ => Err(UnknownLabel {
                kind: "payment method",
                value: s.to_string(),
            }),
        }
    }
}

/// Order status. Any variant may follow any other; there is no enforced
/// progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Em andamento")]
    InProgress,
    #[serde(rename = "Saiu para entrega")]
    OutForDelivery,
    #[serde(rename = "Finalizado")]
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::InProgress,
        OrderStatus::OutForDelivery,
        OrderStatus::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::InProgress => "Em andamento",
            OrderStatus::OutForDelivery => "Saiu para entrega",
            OrderStatus::Completed => "Finalizado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "em andamento" | "in progress" | "inprogress" => Ok(OrderStatus::InProgress),
            "saiu para entrega" | "out for delivery" | "outfordelivery" => {
                Ok(OrderStatus::OutForDelivery)
            }
            "finalizado" | "completed" => Ok(OrderStatus::Completed),
            _ => Err(UnknownLabel {
                kind: "order status",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// One row of the order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Creation timestamp as stored, `DATE_FORMAT`.
    pub date: String,
    pub name: String,
    pub phone: String,
    pub product: String,
    pub quantity: u32,
    pub payment: PaymentMethod,
    pub status: OrderStatus,
    /// `None` only for rows written by revisions that had no total column.
    pub line_total: Option<f64>,
}

/// Editable subset of an order. Date, product, quantity and line total are
/// fixed at creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub payment: Option<PaymentMethod>,
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.payment.is_none() && self.status.is_none()
    }

    pub fn apply(&self, order: &mut Order) {
        if let Some(name) = &self.name {
            order.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            order.phone = phone.clone();
        }
        if let Some(payment) = self.payment {
            order.payment = payment;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
    }
}
