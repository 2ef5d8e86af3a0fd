//! Customer notifications through the WhatsApp (Evolution API) gateway.
//!
//! Notifications never block the order flow: a number that does not
//! normalise to a Brazilian mobile is skipped, and gateway failures are
//! logged and reported back as an outcome, not an error.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{ConfigError, NotifierConfig};
use crate::models::{Order, OrderStatus};

/// Country code prepended to 11-digit local numbers.
pub const COUNTRY_CODE: &str = "55";
const LOCAL_NUMBER_DIGITS: usize = 11;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Transport(String),
    #[error("Erro ao enviar (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Result of one notification attempt, reported to the caller alongside the
/// order operation that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum NotifyOutcome {
    Sent { number: String },
    Skipped { reason: String },
    Failed { number: String, error: String },
}

/// Outbound text-message channel.
pub trait MessageSender {
    fn send_text(&self, number: &str, text: &str) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// Phone numbers and templates
// ---------------------------------------------------------------------------

pub fn normalize_phone(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Gateway number for `phone`: its digits prefixed with the country code,
/// or `None` unless there are exactly 11 digits.
pub fn whatsapp_number(phone: &str) -> Option<String> {
    let digits = normalize_phone(phone);
    (digits.len() == LOCAL_NUMBER_DIGITS).then(|| format!("{COUNTRY_CODE}{digits}"))
}

pub fn order_created_message(order: &Order) -> String {
    format!(
        "Olá {}! Recebemos seu pedido de *{}x {}* com sucesso.\n\
         Forma de pagamento: *{}*.\n\
         Status atual: *{}*.\n\n\
         Obrigado pela preferência! 😊",
        order.name, order.quantity, order.product, order.payment, order.status
    )
}

pub fn status_changed_message(order: &Order, status: OrderStatus) -> String {
    format!(
        "Olá {}, o status do seu pedido de *{}* foi atualizado para: *{}*.",
        order.name, order.product, status
    )
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

pub struct Notifier {
    sender: Box<dyn MessageSender>,
}

impl Notifier {
    pub fn new(sender: Box<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Send `message` to `phone` if it normalises to a valid number.
    pub fn notify(&self, phone: &str, message: &str) -> NotifyOutcome {
        let Some(number) = whatsapp_number(phone) else {
            warn!(phone = %phone, "invalid phone number for notification, skipping");
            return NotifyOutcome::Skipped {
                reason: format!("Número de telefone inválido para envio: {phone}"),
            };
        };

        match self.sender.send_text(&number, message) {
            Ok(()) => {
                info!(number = %number, "notification sent");
                NotifyOutcome::Sent { number }
            }
            Err(e) => {
                warn!(number = %number, error = %e, "notification failed");
                NotifyOutcome::Failed {
                    number,
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn order_created(&self, order: &Order) -> NotifyOutcome {
        self.notify(&order.phone, &order_created_message(order))
    }

    /// Status-change notice. Orders without a phone are skipped quietly.
    pub fn status_changed(&self, order: &Order, status: OrderStatus) -> NotifyOutcome {
        if order.phone.trim().is_empty() {
            return NotifyOutcome::Skipped {
                reason: "Pedido sem telefone".to_string(),
            };
        }
        self.notify(&order.phone, &status_changed_message(order, status))
    }
}

// ---------------------------------------------------------------------------
// Evolution API gateway
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SendTextPayload<'a> {
    number: &'a str,
    text: &'a str,
}

/// `POST {BASE_URL}/message/sendText/{INSTANCE_NAME}` with an `apikey`
/// header. Credentials are re-read from `config.json` on every send.
pub struct EvolutionGateway {
    config_path: PathBuf,
}

impl EvolutionGateway {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }
}

impl MessageSender for EvolutionGateway {
    fn send_text(&self, number: &str, text: &str) -> Result<(), NotifyError> {
        let config = NotifierConfig::load(&self.config_path)?;
        let url = config.send_text_url();
        let client = Client::builder()
            .build()
            .map_err(|e| NotifyError::Transport(format!("Falha ao criar cliente HTTP: {e}")))?;

        let resp = client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("apikey", config.token.as_str())
            .json(&SendTextPayload { number, text })
            .send()
            .map_err(|e| NotifyError::Transport(friendly_error(&url, &e)))?;

        let status = resp.status();
        if status == StatusCode::OK {
            return Ok(());
        }
        let body = resp.text().unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Erro de conexão: não foi possível alcançar {url}");
    }
    if err.is_timeout() {
        return format!("Erro de conexão: tempo esgotado em {url}");
    }
    if err.is_builder() {
        return format!("BASE_URL inválida: {url}");
    }
    format!("Erro de conexão com {url}: {err}")
}
