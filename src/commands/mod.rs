//! User actions. Each command returns a JSON result for display, and turns
//! every failure into a user-facing message.

pub mod dashboard;
pub mod orders;
pub mod reports;
pub mod system;

use serde_json::Value;

/// The user-facing message of a `success: false` result, or `None` when the
/// command succeeded. Rejected form fields are listed after the message.
pub fn failure_message(result: &Value) -> Option<String> {
    if result.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    let mut message = result
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Operação não concluída.")
        .to_string();
    if let Some(fields) = result.get("invalidFields").and_then(Value::as_array) {
        let names: Vec<&str> = fields.iter().filter_map(Value::as_str).collect();
        if !names.is_empty() {
            message.push_str("\nCampos: ");
            message.push_str(&names.join(", "));
        }
    }
    Some(message)
}


#[cfg(test)]
mod tests {
    use super::testing::{now, test_state};
    use super::*;
    use crate::validation::{OrderForm, MSG_FIX_FIELDS};

    #[test]
    fn rejected_form_message_lists_fields() {
        let t = test_state();
        let form = OrderForm {
            name: "Ana".into(),
            phone: "123".into(),
            product: "Bolo".into(),
            quantity: "3.5".into(),
            payment: "Pix".into(),
            status: String::new(),
        };
        let result = orders::order_create(&t.state, &form, now()).unwrap();
        assert_eq!(
            failure_message(&result).unwrap(),
            format!("{MSG_FIX_FIELDS}\nCampos: quantity")
        );
    }

    #[test]
    fn successful_and_informational_results_have_no_failure() {
        let t = test_state();
        let listed = orders::order_get_all(&t.state).unwrap();
        assert_eq!(failure_message(&listed), None);

        let report = reports::report_generate_daily(&t.state, now().date()).unwrap();
        assert_eq!(failure_message(&report), None);
    }
}
