//! Emails the daily report spreadsheet over SMTP (STARTTLS + login).

use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{ConfigError, EmailConfig};

pub const REPORT_SUBJECT: &str = "Relatório de Pedidos do Dia";
pub const REPORT_BODY: &str = "Segue em anexo o relatório de pedidos do dia.";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Falha ao ler o anexo {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Endereço de e-mail inválido '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("Falha ao montar e-mail: {0}")]
    Build(String),
    #[error("Falha ao enviar e-mail: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Delivers a generated report file.
pub trait ReportMailer {
    fn send_report(&self, path: &Path) -> Result<(), MailError>;
}

/// Compose the report message with `path` attached as an xlsx file.
pub fn compose_report(config: &EmailConfig, path: &Path) -> Result<Message, MailError> {
    let content = fs::read(path).map_err(|source| MailError::Attachment {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "relatorio.xlsx".to_string());
    let content_type =
        ContentType::parse(XLSX_MIME).map_err(|e| MailError::Build(e.to_string()))?;

    Message::builder()
        .from(parse_mailbox(&config.sender)?)
        .to(parse_mailbox(&config.recipient)?)
        .subject(REPORT_SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(REPORT_BODY.to_string()))
                .singlepart(Attachment::new(filename).body(content, content_type)),
        )
        .map_err(|e| MailError::Build(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<lettre::message::Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// SMTP delivery using the account in `config.json`, re-read on every send.
pub struct SmtpMailer {
    config_path: PathBuf,
}

impl SmtpMailer {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }
}

impl ReportMailer for SmtpMailer {
    fn send_report(&self, path: &Path) -> Result<(), MailError> {
        let config = EmailConfig::load(&self.config_path)?;
        let message = compose_report(&config, path)?;

        let credentials = Credentials::new(config.sender.clone(), config.password.to_string());
        let mailer = SmtpTransport::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();
        mailer.send(&message)?;

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            recipient = %config.recipient,
            report = %path.display(),
            "daily report emailed"
        );
        Ok(())
    }
}
