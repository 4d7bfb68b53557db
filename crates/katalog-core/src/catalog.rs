use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::schema::CatalogSchema;

/// A vendor product: its child elements in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Product {
    pub fields: Vec<Field>,
}

/// One child element of a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Leaf element, e.g. `<UrunAdi>Elbise</UrunAdi>`.
    Text(String),
    /// Element whose children are leaves, e.g. `<Resimler><Resim>..</Resim></Resimler>`.
    Group(Vec<TextField>),
    /// The variant list element (`UrunSecenek` by default).
    Variants(Vec<Variant>),
}

/// A leaf element: tag name and text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub name: String,
    pub value: String,
}

impl TextField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A purchasable unit of a [`Product`]: barcode, price, stock and attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Variant {
    pub fields: Vec<TextField>,
}

impl Variant {
    /// Text of the first field named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

impl Product {
    /// Text of the first leaf field named `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match &f.value {
            FieldValue::Text(t) if f.name == name => Some(t.as_str()),
            _ => None,
        })
    }

    /// All variants across every variant-list field, in document order.
    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.fields
            .iter()
            .filter_map(|f| match &f.value {
                FieldValue::Variants(vs) => Some(vs),
                _ => None,
            })
            .flatten()
    }

    /// The key deciding whether this product was already translated.
    ///
    /// Canonical rule: the trimmed translation-id text of the first variant
    /// of the first variant list. Missing or blank means no id.
    #[must_use]
    pub fn translation_id(&self, schema: &CatalogSchema) -> Option<&str> {
        self.fields
            .iter()
            .find_map(|f| match &f.value {
                FieldValue::Variants(vs) if f.name == schema.variant_list_tag => vs.first(),
                _ => None,
            })
            .and_then(|v| v.get(&schema.translation_id_tag))
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Trimmed, non-blank barcodes of every variant.
    #[must_use]
    pub fn barcodes(&self, schema: &CatalogSchema) -> Vec<&str> {
        self.variants()
            .filter_map(|v| v.get(&schema.barcode_tag))
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .collect()
    }
}

/// The persisted output catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Translation ids whose products have been translated once already.
///
/// Serialized as a flat JSON array; duplicates in a file collapse on read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedIds(BTreeSet<String>);

impl TranslatedIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Returns `true` if the id was not present before.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TranslatedIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
