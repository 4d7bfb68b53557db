use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Element names of the vendor feed and the output catalog.
///
/// The defaults describe the Yakamoz feed; a YAML file can override any of
/// them (missing keys keep their defaults).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSchema {
    pub root_tag: String,
    pub product_list_tag: String,
    pub product_tag: String,
    pub variant_list_tag: String,
    pub variant_tag: String,
    pub translation_id_tag: String,
    pub barcode_tag: String,
    pub price_tag: String,
    /// Product-level fields passed through the translator.
    pub translatable_fields: Vec<String>,
    /// Variant-level attributes passed through the translator.
    pub translatable_variant_fields: Vec<String>,
}

impl Default for CatalogSchema {
    fn default() -> Self {
        Self {
            root_tag: "Root".to_string(),
            product_list_tag: "Urunler".to_string(),
            product_tag: "Urun".to_string(),
            variant_list_tag: "UrunSecenek".to_string(),
            variant_tag: "Secenek".to_string(),
            translation_id_tag: "VaryasyonID".to_string(),
            barcode_tag: "Barkod".to_string(),
            price_tag: "SatisFiyati".to_string(),
            translatable_fields: vec![
                "UrunAdi".to_string(),
                "Aciklama".to_string(),
                "MateryalBileseni".to_string(),
            ],
            translatable_variant_fields: vec![
                "EkSecenekOzellik".to_string(),
                "ozellik".to_string(),
            ],
        }
    }
}

impl CatalogSchema {
    #[must_use]
    pub fn is_translatable_field(&self, name: &str) -> bool {
        self.translatable_fields.iter().any(|f| f == name)
    }

    #[must_use]
    pub fn is_translatable_variant_field(&self, name: &str) -> bool {
        self.translatable_variant_fields.iter().any(|f| f == name)
    }
}

/// Load and validate a catalog schema override from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_schema(path: &Path) -> Result<CatalogSchema, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SchemaFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let schema: CatalogSchema = serde_yaml::from_str(&content)?;
    validate_schema(&schema)?;

    Ok(schema)
}

fn validate_schema(schema: &CatalogSchema) -> Result<(), ConfigError> {
    let structural = [
        ("root_tag", &schema.root_tag),
        ("product_list_tag", &schema.product_list_tag),
        ("product_tag", &schema.product_tag),
        ("variant_list_tag", &schema.variant_list_tag),
        ("variant_tag", &schema.variant_tag),
        ("translation_id_tag", &schema.translation_id_tag),
        ("barcode_tag", &schema.barcode_tag),
        ("price_tag", &schema.price_tag),
    ];

    for (key, value) in &structural {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{key} must be non-empty")));
        }
    }

    // The writer and reader locate products by tag name alone.
    let mut seen = HashSet::new();
    for (key, value) in &structural[..5] {
        if !seen.insert(value.as_str()) {
            return Err(ConfigError::Validation(format!(
                "{key} '{value}' collides with another structural tag"
            )));
        }
    }

    let price = schema.price_tag.as_str();
    if schema.translatable_variant_fields.iter().any(|f| f == price) {
        return Err(ConfigError::Validation(format!(
            "price tag '{price}' cannot also be a translatable variant field"
        )));
    }

    Ok(())
}
