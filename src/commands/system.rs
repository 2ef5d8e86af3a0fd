use crate::{diagnostics, AppState};

pub fn system_get_about() -> Result<serde_json::Value, String> {
    Ok(diagnostics::get_about_info())
}

/// Products offered by the order form, with unit prices.
pub fn catalog_get_products(state: &AppState) -> Result<serde_json::Value, String> {
    let products: Vec<serde_json::Value> = state
        .catalog
        .products()
        .map(|(name, price)| serde_json::json!({ "name": name, "price": price }))
        .collect();
    Ok(serde_json::json!({
        "success": true,
        "count": products.len(),
        "products": products,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::test_state;

    #[test]
    fn products_are_listed_by_name() {
        let t = test_state();
        let result = catalog_get_products(&t.state).unwrap();
        assert_eq!(result["count"], 2);
        assert_eq!(result["products"][0]["name"], "Bolo");
        assert_eq!(result["products"][0]["price"], 25.5);
        assert_eq!(result["products"][1]["name"], "Brigadeiro");
    }

    #[test]
    fn about_reports_version() {
        let about = system_get_about().unwrap();
        assert_eq!(about["version"], env!("CARGO_PKG_VERSION"));
    }
}
