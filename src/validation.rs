//! Order form validation.
//!
//! Everything is checked before the store is touched: a form either turns
//! into a complete `Order` or into a `ValidationError` naming every
//! offending field.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Catalog;
use crate::models::{Order, OrderId, OrderStatus, PaymentMethod, DATE_FORMAT};

pub const MSG_FIX_FIELDS: &str = "Preencha corretamente os campos em destaque.";
pub const MSG_SELECT_PAYMENT: &str = "Selecione a forma de pagamento.";

/// Raw text exactly as typed into the order form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderForm {
    pub name: String,
    pub phone: String,
    pub product: String,
    pub quantity: String,
    pub payment: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Phone,
    Product,
    Quantity,
    Payment,
    Status,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormField::Name => "Nome do Cliente",
            FormField::Phone => "Telefone",
            FormField::Product => "Produto",
            FormField::Quantity => "Quantidade",
            FormField::Payment => "Forma de Pagamento",
            FormField::Status => "Status do Pedido",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Offending fields, sorted and without duplicates.
    pub fields: Vec<FormField>,
    pub message: String,
}

/// Parse a form quantity: a positive integer, nothing else.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|q| *q > 0)
}

/// Validate `form` against `catalog` and build the order it describes.
/// `now` is the creation timestamp written to the `Data` column.
pub fn validate(
    form: &OrderForm,
    catalog: &Catalog,
    now: NaiveDateTime,
) -> Result<Order, ValidationError> {
    let name = form.name.trim();
    let phone = form.phone.trim();
    let product = form.product.trim();
    let quantity_raw = form.quantity.trim();
    let payment_raw = form.payment.trim();
    let status_raw = form.status.trim();

    let mut fields = Vec::new();
    if name.is_empty() {
        fields.push(FormField::Name);
    }
    if phone.is_empty() {
        fields.push(FormField::Phone);
    }
    if product.is_empty() {
        fields.push(FormField::Product);
    }
    let quantity = parse_quantity(quantity_raw);
    if quantity.is_none() {
        fields.push(FormField::Quantity);
    }
    let payment = payment_raw.parse::<PaymentMethod>().ok();
    if payment.is_none() {
        fields.push(FormField::Payment);
    }
    let status = if status_raw.is_empty() {
        Some(OrderStatus::default())
    } else {
        status_raw.parse::<OrderStatus>().ok()
    };
    if status.is_none() {
        fields.push(FormField::Status);
    }

    let (Some(quantity), Some(payment), Some(status), true) =
        (quantity, payment, status, fields.is_empty())
    else {
        let mut message = MSG_FIX_FIELDS.to_string();
        if fields.contains(&FormField::Payment) {
            message.push('\n');
            message.push_str(MSG_SELECT_PAYMENT);
        }
        fields.sort();
        fields.dedup();
        return Err(ValidationError { fields, message });
    };

    let Some(unit_price) = catalog.price(product) else {
        return Err(ValidationError {
            fields: vec![FormField::Product],
            message: format!("O produto '{product}' não está cadastrado em produtos.json."),
        });
    };

    Ok(Order {
        id: OrderId::new(),
        date: now.format(DATE_FORMAT).to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        product: product.to_string(),
        quantity,
        payment,
        status,
        line_total: Some(f64::from(quantity) * unit_price),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn catalog() -> Catalog {
        [("Bolo".to_string(), 25.5), ("Brigadeiro".to_string(), 2.0)]
            .into_iter()
            .collect()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    fn form() -> OrderForm {
        OrderForm {
            name: " Ana ".into(),
            phone: "(11) 99999-8888".into(),
            product: "Bolo".into(),
            quantity: "3".into(),
            payment: "Pix".into(),
            status: String::new(),
        }
    }

    #[test]
    fn valid_form_computes_line_total_and_defaults_status() {
        let order = validate(&form(), &catalog(), now()).unwrap();
        assert_eq!(order.name, "Ana");
        assert_eq!(order.phone, "(11) 99999-8888");
        assert_eq!(order.quantity, 3);
        assert_eq!(order.line_total, Some(76.5));
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.date, "18/10/2026 14:05:09");
    }

    #[test]
    fn explicit_status_is_kept() {
        let mut f = form();
        f.status = "Saiu para entrega".into();
        let order = validate(&f, &catalog(), now()).unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);
    }

    #[test]
    fn quantity_parsing() {
        assert_eq!(parse_quantity("3"), Some(3));
        assert_eq!(parse_quantity(" 12 "), Some(12));
        for bad in ["3.5", "abc", "", "-1", "0", "1e3"] {
            assert_eq!(parse_quantity(bad), None, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn every_missing_field_is_reported() {
        let empty = OrderForm::default();
        let err = validate(&empty, &catalog(), now()).unwrap_err();
        assert_eq!(
            err.fields,
            vec![
                FormField::Name,
                FormField::Phone,
                FormField::Product,
                FormField::Quantity,
                FormField::Payment,
            ]
        );
        assert_eq!(err.message, format!("{MSG_FIX_FIELDS}\n{MSG_SELECT_PAYMENT}"));
    }

    #[test]
    fn bad_quantity_alone_is_flagged_without_payment_hint() {
        let mut f = form();
        f.quantity = "-1".into();
        let err = validate(&f, &catalog(), now()).unwrap_err();
        assert_eq!(err.fields, vec![FormField::Quantity]);
        assert_eq!(err.message, MSG_FIX_FIELDS);
    }

    #[test]
    fn unknown_payment_and_status_are_field_errors() {
        let mut f = form();
        f.payment = "Dinheiro".into();
        f.status = "Cancelado".into();
        let err = validate(&f, &catalog(), now()).unwrap_err();
        assert_eq!(err.fields, vec![FormField::Payment, FormField::Status]);
        assert!(err.message.ends_with(MSG_SELECT_PAYMENT));
    }

    #[test]
    fn product_missing_from_catalog_is_rejected() {
        let mut f = form();
        f.product = "Torta".into();
        let err = validate(&f, &catalog(), now()).unwrap_err();
        assert_eq!(err.fields, vec![FormField::Product]);
        assert_eq!(
            err.message,
            "O produto 'Torta' não está cadastrado em produtos.json."
        );
    }
}
