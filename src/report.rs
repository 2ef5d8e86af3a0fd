//! Daily report: today's orders exported to `relatorios/relatorio_<date>.xlsx`
//! and handed to the mailer.

use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::dashboard::orders_on;
use crate::mailer::ReportMailer;
use crate::models::Order;
use crate::store::{self, OrderStore, StoreError};

pub const MSG_NO_ORDERS: &str = "Nenhum pedido cadastrado ainda.";
pub const MSG_NO_ORDERS_TODAY: &str = "Nenhum pedido registrado para o dia de hoje.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum EmailOutcome {
    Sent,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ReportOutcome {
    /// The store has no orders at all.
    NoOrders,
    /// Orders exist, none dated `today`. No file is written.
    NoOrdersToday,
    Generated {
        path: PathBuf,
        orders: usize,
        email: EmailOutcome,
    },
}

impl ReportOutcome {
    pub fn message(&self) -> String {
        match self {
            ReportOutcome::NoOrders => MSG_NO_ORDERS.to_string(),
            ReportOutcome::NoOrdersToday => MSG_NO_ORDERS_TODAY.to_string(),
            ReportOutcome::Generated { path, email, .. } => {
                let saved = format!("Relatório gerado e salvo em {}.", path.display());
                match email {
                    EmailOutcome::Sent => format!("Relatório enviado por e-mail.\n{saved}"),
                    EmailOutcome::Failed { error } => format!("{error}\n{saved}"),
                }
            }
        }
    }
}

pub fn report_file_name(day: NaiveDate) -> String {
    format!("relatorio_{}.xlsx", day.format("%d-%m-%Y"))
}

/// Write `orders` for `day` into `reports_dir`, creating the directory.
pub fn write_daily_report(
    reports_dir: &Path,
    day: NaiveDate,
    orders: &[Order],
) -> Result<PathBuf, StoreError> {
    fs::create_dir_all(reports_dir).map_err(|source| StoreError::Io {
        path: reports_dir.to_path_buf(),
        source,
    })?;
    let path = reports_dir.join(report_file_name(day));
    store::write_orders(&path, orders)?;
    Ok(path)
}

/// Export today's orders and email the file. A mail failure is part of the
/// outcome and leaves the written file in place.
pub fn generate_daily_report(
    store: &OrderStore,
    mailer: &dyn ReportMailer,
    reports_dir: &Path,
    today: NaiveDate,
) -> Result<ReportOutcome, StoreError> {
    let orders = store.load()?;
    if orders.is_empty() {
        return Ok(ReportOutcome::NoOrders);
    }

    let todays: Vec<Order> = orders_on(&orders, today).into_iter().cloned().collect();
    if todays.is_empty() {
        info!(date = %today, "no orders today, report not generated");
        return Ok(ReportOutcome::NoOrdersToday);
    }

    let path = write_daily_report(reports_dir, today, &todays)?;
    info!(path = %path.display(), orders = todays.len(), "daily report written");

    let email = match mailer.send_report(&path) {
        Ok(()) => EmailOutcome::Sent,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "daily report email failed");
            EmailOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    Ok(ReportOutcome::Generated {
        path,
        orders: todays.len(),
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::testing::RecordingMailer;
    use crate::models::{OrderId, OrderStatus, PaymentMethod};

    fn order(date: &str, name: &str) -> Order {
        Order {
            id: OrderId::new(),
            date: date.into(),
            name: name.into(),
            phone: "11999998888".into(),
            product: "Bolo".into(),
            quantity: 1,
            payment: PaymentMethod::Pix,
            status: OrderStatus::Completed,
            line_total: Some(25.5),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn file_name_embeds_day_first_date() {
        assert_eq!(report_file_name(today()), "relatorio_18-10-2026.xlsx");
    }

    #[test]
    fn empty_store_reports_no_orders() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::new(dir.path().join("pedidos.xlsx"));
        let mailer = RecordingMailer::default();
        let reports = dir.path().join("relatorios");

        let outcome = generate_daily_report(&store, &mailer, &reports, today()).unwrap();
        assert_eq!(outcome, ReportOutcome::NoOrders);
        assert_eq!(outcome.message(), MSG_NO_ORDERS);
        assert!(!reports.exists());
    }

    #[test]
    fn no_orders_today_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::new(dir.path().join("pedidos.xlsx"));
        store.append(order("17/10/2026 20:00:00", "Ana")).unwrap();
        let mailer = RecordingMailer::default();
        let reports = dir.path().join("relatorios");

        let outcome = generate_daily_report(&store, &mailer, &reports, today()).unwrap();
        assert_eq!(outcome, ReportOutcome::NoOrdersToday);
        assert!(!reports.join(report_file_name(today())).exists());
        assert!(mailer.sent.borrow().is_empty());
    }

    #[test]
    fn todays_rows_are_exported_and_mailed() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::new(dir.path().join("pedidos.xlsx"));
        store.append(order("17/10/2026 20:00:00", "Ontem")).unwrap();
        store.append(order("18/10/2026 09:00:00", "Ana")).unwrap();
        store.append(order("18/10/2026 11:30:00", "Bruno")).unwrap();
        let mailer = RecordingMailer::default();
        let reports = dir.path().join("relatorios");

        let outcome = generate_daily_report(&store, &mailer, &reports, today()).unwrap();
        let ReportOutcome::Generated {
            path,
            orders,
            email,
        } = outcome
        else {
            panic!("expected a generated report");
        };
        assert_eq!(orders, 2);
        assert_eq!(email, EmailOutcome::Sent);
        assert_eq!(path, reports.join("relatorio_18-10-2026.xlsx"));
        assert_eq!(mailer.sent.borrow().as_slice(), &[path.clone()]);

        let exported = OrderStore::new(&path).load().unwrap();
        let names: Vec<&str> = exported.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);
    }

    #[test]
    fn mail_failure_keeps_the_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::new(dir.path().join("pedidos.xlsx"));
        store.append(order("18/10/2026 09:00:00", "Ana")).unwrap();
        let mailer = RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        };
        let reports = dir.path().join("relatorios");

        let outcome = generate_daily_report(&store, &mailer, &reports, today()).unwrap();
        match &outcome {
            ReportOutcome::Generated { path, email, .. } => {
                assert!(path.exists());
                assert!(matches!(email, EmailOutcome::Failed { .. }));
            }
            other => panic!("expected generated report, got {other:?}"),
        }
        assert!(outcome.message().contains("Relatório gerado e salvo em"));
    }
}
