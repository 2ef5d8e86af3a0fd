//! Daily dashboard figures, recomputed from the full order history on every
//! refresh.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::models::{Order, DATE_FORMAT};

pub const NO_TOP_PRODUCT: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub count: usize,
    pub revenue: f64,
    pub top_product: String,
}

impl DailySummary {
    pub fn empty() -> Self {
        Self {
            count: 0,
            revenue: 0.0,
            top_product: NO_TOP_PRODUCT.to_string(),
        }
    }

    /// Revenue the way the dashboard card shows it, e.g. `R$ 76.50`.
    pub fn revenue_display(&self) -> String {
        format_brl(self.revenue)
    }
}

pub fn format_brl(value: f64) -> String {
    format!("R$ {value:.2}")
}

/// Day portion of a stored `Data` value. Day-first: `18/10/2026 14:05:09`,
/// `18/10/2026`, or ISO `2026-10-18...` from hand-edited sheets.
pub fn order_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATE_FORMAT) {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%d/%m/%Y %H:%M") {
        return Some(dt.date());
    }
    let date_part = raw.split_whitespace().next()?;
    if let Ok(day) = NaiveDate::parse_from_str(date_part, "%d/%m/%Y") {
        return Some(day);
    }
    NaiveDate::parse_from_str(date_part.get(..10)?, "%Y-%m-%d").ok()
}

/// Orders whose `Data` falls on `day`. Rows with an unreadable date are
/// skipped.
pub fn orders_on(orders: &[Order], day: NaiveDate) -> Vec<&Order> {
    orders
        .iter()
        .filter(|order| match order_day(&order.date) {
            Some(d) => d == day,
            None => {
                warn!(order_id = %order.id, date = %order.date, "skipping order with unreadable date");
                false
            }
        })
        .collect()
}

/// Count, revenue and best-selling product for `today`. Missing line totals
/// count as zero; ties for best seller go to the alphabetically first name.
pub fn summarize(orders: &[Order], today: NaiveDate) -> DailySummary {
    let todays = orders_on(orders, today);
    if todays.is_empty() {
        return DailySummary::empty();
    }

    let revenue: f64 = todays.iter().map(|o| o.line_total.unwrap_or(0.0)).sum();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for order in &todays {
        *counts.entry(order.product.as_str()).or_insert(0) += 1;
    }
    // BTreeMap iterates by name, so the first maximum wins ties.
    let mut top: Option<(&str, usize)> = None;
    for (product, count) in counts {
        if top.map_or(true, |(_, best)| count > best) {
            top = Some((product, count));
        }
    }

    DailySummary {
        count: todays.len(),
        revenue,
        top_product: top
            .map(|(p, _)| p.to_string())
            .unwrap_or_else(|| NO_TOP_PRODUCT.to_string()),
    }
}
