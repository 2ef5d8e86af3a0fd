use chrono::NaiveDate;

use crate::report::{self, ReportOutcome};
use crate::AppState;

/// Export today's orders and email them. "No orders" outcomes are
/// informational: `success: true`, `generated: false`, and nothing is written.
pub fn report_generate_daily(
    state: &AppState,
    today: NaiveDate,
) -> Result<serde_json::Value, String> {
    let outcome = report::generate_daily_report(
        &state.store,
        state.mailer.as_ref(),
        &state.settings.reports_dir,
        today,
    )
    .map_err(|e| e.to_string())?;

    let generated = matches!(outcome, ReportOutcome::Generated { .. });
    Ok(serde_json::json!({
        "success": true,
        "generated": generated,
        "message": outcome.message(),
        "report": outcome,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::orders::order_create;
    use crate::commands::testing::{now, test_state};
    use crate::validation::OrderForm;

    #[test]
    fn report_without_orders_today() {
        let t = test_state();
        let result = report_generate_daily(&t.state, now().date()).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["generated"], false);
        assert_eq!(result["report"]["outcome"], "noOrders");
        assert_eq!(result["message"], "Nenhum pedido cadastrado ainda.");
        assert!(!t.state.settings.reports_dir.exists());
    }

    #[test]
    fn report_is_written_and_mailed() {
        let t = test_state();
        let form = OrderForm {
            name: "Ana".into(),
            phone: "11999998888".into(),
            product: "Bolo".into(),
            quantity: "1".into(),
            payment: "Pix".into(),
            status: "Finalizado".into(),
        };
        order_create(&t.state, &form, now()).unwrap();

        let result = report_generate_daily(&t.state, now().date()).unwrap();
        assert_eq!(result["generated"], true);
        assert_eq!(result["report"]["email"]["outcome"], "sent");
        let expected = t.state.settings.reports_dir.join("relatorio_18-10-2026.xlsx");
        assert!(expected.exists());
        assert_eq!(t.mailed.borrow().as_slice(), &[expected]);
    }
}
