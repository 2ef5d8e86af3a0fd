//! File locations and gateway configuration.
//!
//! `Settings` is resolved once at start-up. Gateway credentials live in
//! `config.json` and are re-read on every send so edits apply without a
//! restart.

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

pub const DEFAULT_STORE_FILE: &str = "pedidos.xlsx";
pub const DEFAULT_CATALOG_FILE: &str = "produtos.json";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_REPORTS_DIR: &str = "relatorios";

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Arquivo {} não encontrado.", .0.display())]
    Missing(PathBuf),
    #[error("Falha ao ler configurações: {0}")]
    Io(#[from] std::io::Error),
    #[error("Falha ao ler configurações: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Verifique se {} estão presentes no config.json", .0.join(", "))]
    MissingKeys(Vec<&'static str>),
    #[error("SMTP_PORTA inválida: {0}")]
    InvalidPort(String),
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Paths of the files the application reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub catalog_path: PathBuf,
    pub config_path: PathBuf,
    pub reports_dir: PathBuf,
}

impl Settings {
    /// All files under one directory, using the default file names.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            store_path: dir.join(DEFAULT_STORE_FILE),
            catalog_path: dir.join(DEFAULT_CATALOG_FILE),
            config_path: dir.join(DEFAULT_CONFIG_FILE),
            reports_dir: dir.join(DEFAULT_REPORTS_DIR),
        }
    }
}

// ---------------------------------------------------------------------------
// config.json
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(rename = "BASE_URL", default)]
    base_url: Option<String>,
    #[serde(rename = "INSTANCE_NAME", default)]
    instance_name: Option<String>,
    #[serde(rename = "EVOLUTION_TOKEN", default)]
    evolution_token: Option<String>,
    #[serde(rename = "EMAIL_REMETENTE", default)]
    email_sender: Option<String>,
    #[serde(rename = "EMAIL_DESTINO", default)]
    email_recipient: Option<String>,
    #[serde(rename = "EMAIL_SENHA", default)]
    email_password: Option<String>,
    #[serde(rename = "SMTP_SERVIDOR", default)]
    smtp_host: Option<String>,
    #[serde(rename = "SMTP_PORTA", default)]
    smtp_port: Option<Value>,
}

fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Takes the trimmed value when present and non-empty, otherwise records
/// `key` as missing.
fn required(
    value: Option<String>,
    key: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => {
            missing.push(key);
            String::new()
        }
    }
}

/// Chat gateway credentials.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub base_url: String,
    pub instance_name: String,
    pub token: Zeroizing<String>,
}

impl NotifierConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = read_raw(path)?;
        let mut missing = Vec::new();
        let base_url = required(raw.base_url, "BASE_URL", &mut missing);
        let instance_name = required(raw.instance_name, "INSTANCE_NAME", &mut missing);
        let token = required(raw.evolution_token, "EVOLUTION_TOKEN", &mut missing);
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }
        Ok(Self {
            base_url,
            instance_name,
            token: Zeroizing::new(token),
        })
    }

    /// `{BASE_URL}/message/sendText/{INSTANCE_NAME}`
    pub fn send_text_url(&self) -> String {
        format!(
            "{}/message/sendText/{}",
            self.base_url.trim_end_matches('/'),
            self.instance_name
        )
    }
}

/// SMTP account used to mail the daily report.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub sender: String,
    pub recipient: String,
    pub password: Zeroizing<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl EmailConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = read_raw(path)?;
        let mut missing = Vec::new();
        let sender = required(raw.email_sender, "EMAIL_REMETENTE", &mut missing);
        let recipient = required(raw.email_recipient, "EMAIL_DESTINO", &mut missing);
        let password = required(raw.email_password, "EMAIL_SENHA", &mut missing);
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }
        let smtp_host = raw
            .smtp_host
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = match raw.smtp_port {
            None | Some(Value::Null) => DEFAULT_SMTP_PORT,
            Some(value) => parse_port(&value)?,
        };
        Ok(Self {
            sender,
            recipient,
            password: Zeroizing::new(password),
            smtp_host,
            smtp_port,
        })
    }
}

fn parse_port(value: &Value) -> Result<u16, ConfigError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };
    parsed
        .filter(|p| *p != 0)
        .ok_or_else(|| ConfigError::InvalidPort(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn notifier_config_builds_send_text_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"BASE_URL": "https://api.example.com/", "INSTANCE_NAME": "loja", "EVOLUTION_TOKEN": "t0k"}"#,
        );
        let config = NotifierConfig::load(&path).unwrap();
        assert_eq!(
            config.send_text_url(),
            "https://api.example.com/message/sendText/loja"
        );
        assert_eq!(config.token.as_str(), "t0k");
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"BASE_URL": "https://x", "INSTANCE_NAME": "  "}"#);
        match NotifierConfig::load(&path) {
            Err(ConfigError::MissingKeys(keys)) => {
                assert_eq!(keys, vec!["INSTANCE_NAME", "EVOLUTION_TOKEN"])
            }
            other => panic!("expected missing keys, got {other:?}"),
        }
    }

    #[test]
    fn email_config_applies_smtp_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"EMAIL_REMETENTE": "loja@example.com", "EMAIL_DESTINO": "dono@example.com", "EMAIL_SENHA": "s3nha"}"#,
        );
        let config = EmailConfig::load(&path).unwrap();
        assert_eq!(config.smtp_host, DEFAULT_SMTP_HOST);
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn email_port_accepts_number_or_string() {
        let dir = tempfile::tempdir().unwrap();
        let base = r#""EMAIL_REMETENTE": "a@example.com", "EMAIL_DESTINO": "b@example.com", "EMAIL_SENHA": "x""#;

        let path = write_config(dir.path(), &format!(r#"{{{base}, "SMTP_PORTA": 465}}"#));
        assert_eq!(EmailConfig::load(&path).unwrap().smtp_port, 465);

        let path = write_config(dir.path(), &format!(r#"{{{base}, "SMTP_PORTA": "2525"}}"#));
        assert_eq!(EmailConfig::load(&path).unwrap().smtp_port, 2525);

        let path = write_config(dir.path(), &format!(r#"{{{base}, "SMTP_PORTA": "smtp"}}"#));
        assert!(matches!(
            EmailConfig::load(&path),
            Err(ConfigError::InvalidPort(_))
        ));
    }

    #[test]
    fn missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EmailConfig::load(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn edits_to_config_file_apply_on_next_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"BASE_URL": "https://a.example.com", "INSTANCE_NAME": "loja", "EVOLUTION_TOKEN": "old",
                "EMAIL_REMETENTE": "a@example.com", "EMAIL_DESTINO": "b@example.com", "EMAIL_SENHA": "x"}"#,
        );
        assert_eq!(NotifierConfig::load(&path).unwrap().token.as_str(), "old");
        assert_eq!(EmailConfig::load(&path).unwrap().smtp_port, DEFAULT_SMTP_PORT);

        write_config(
            dir.path(),
            r#"{"BASE_URL": "https://b.example.com", "INSTANCE_NAME": "filial", "EVOLUTION_TOKEN": "new",
                "EMAIL_REMETENTE": "a@example.com", "EMAIL_DESTINO": "c@example.com", "EMAIL_SENHA": "x",
                "SMTP_PORTA": 465}"#,
        );
        let notifier = NotifierConfig::load(&path).unwrap();
        assert_eq!(notifier.token.as_str(), "new");
        assert_eq!(
            notifier.send_text_url(),
            "https://b.example.com/message/sendText/filial"
        );
        let email = EmailConfig::load(&path).unwrap();
        assert_eq!(email.recipient, "c@example.com");
        assert_eq!(email.smtp_port, 465);
    }
}
