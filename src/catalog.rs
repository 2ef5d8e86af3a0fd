//! Product catalog: product name -> unit price, read once at start-up from
//! `produtos.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Arquivo {} não encontrado.", .0.display())]
    Missing(PathBuf),
    #[error("Erro ao ler produtos: {0}")]
    Io(#[from] std::io::Error),
    #[error("Erro ao ler produtos: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Erro ao ler produtos: preço inválido para '{0}'")]
    InvalidPrice(String),
}

/// Read-only price table. Products iterate in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    prices: BTreeMap<String, f64>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::Missing(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        info!(path = %path.display(), products = catalog.len(), "product catalog loaded");
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let prices: BTreeMap<String, f64> = serde_json::from_str(raw)?;
        if let Some((name, _)) = prices.iter().find(|(_, p)| !p.is_finite() || **p < 0.0) {
            return Err(CatalogError::InvalidPrice(name.clone()));
        }
        Ok(Self { prices })
    }

    pub fn price(&self, product: &str) -> Option<f64> {
        self.prices.get(product).copied()
    }

    pub fn products(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(name, price)| (name.as_str(), *price))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(String, f64)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_flat_price_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("produtos.json");
        fs::write(&path, r#"{"Bolo de cenoura": 25.5, "Brigadeiro": 2}"#).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.price("Bolo de cenoura"), Some(25.5));
        assert_eq!(catalog.price("Brigadeiro"), Some(2.0));
        assert_eq!(catalog.price("Torta"), None);
        let names: Vec<&str> = catalog.products().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Bolo de cenoura", "Brigadeiro"]);
    }

    #[test]
    fn missing_file_is_reported_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(&dir.path().join("produtos.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Missing(_)));
        assert!(err.to_string().contains("produtos.json"));
    }

    #[test]
    fn malformed_json_and_bad_prices_are_rejected() {
        assert!(matches!(
            Catalog::from_json("[1, 2]"),
            Err(CatalogError::Parse(_))
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"Bolo": "caro"}"#),
            Err(CatalogError::Parse(_))
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"Bolo": -1}"#),
            Err(CatalogError::InvalidPrice(name)) if name == "Bolo"
        ));
    }
}
