use chrono::NaiveDate;

use crate::dashboard;
use crate::AppState;

/// Today's cards: order count, revenue and best-selling product.
pub fn dashboard_get_summary(
    state: &AppState,
    today: NaiveDate,
) -> Result<serde_json::Value, String> {
    let orders = state.store.load().map_err(|e| e.to_string())?;
    let summary = dashboard::summarize(&orders, today);

    Ok(serde_json::json!({
        "success": true,
        "date": today.format("%d/%m/%Y").to_string(),
        "ordersToday": summary.count,
        "revenue": summary.revenue,
        "revenueDisplay": summary.revenue_display(),
        "topProduct": summary.top_product,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::orders::order_create;
    use crate::commands::testing::{now, test_state};
    use crate::validation::OrderForm;

    fn form(product: &str, quantity: &str) -> OrderForm {
        OrderForm {
            name: "Cliente".into(),
            phone: "123".into(),
            product: product.into(),
            quantity: quantity.into(),
            payment: "Pix".into(),
            status: String::new(),
        }
    }

    #[test]
    fn empty_store_shows_zero_cards() {
        let t = test_state();
        let result = dashboard_get_summary(&t.state, now().date()).unwrap();
        assert_eq!(result["ordersToday"], 0);
        assert_eq!(result["revenueDisplay"], "R$ 0.00");
        assert_eq!(result["topProduct"], "N/A");
    }

    #[test]
    fn counts_orders_created_today() {
        let t = test_state();
        order_create(&t.state, &form("Bolo", "2"), now()).unwrap();
        order_create(&t.state, &form("Bolo", "1"), now()).unwrap();
        order_create(&t.state, &form("Brigadeiro", "10"), now()).unwrap();

        let result = dashboard_get_summary(&t.state, now().date()).unwrap();
        assert_eq!(result["ordersToday"], 3);
        assert_eq!(result["revenueDisplay"], "R$ 96.50");
        assert_eq!(result["topProduct"], "Bolo");

        let tomorrow = now().date().succ_opt().unwrap();
        let result = dashboard_get_summary(&t.state, tomorrow).unwrap();
        assert_eq!(result["ordersToday"], 0);
    }
}
