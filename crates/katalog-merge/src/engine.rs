//! Incremental catalog merge.
//!
//! Streams candidate products from the vendor feed against the previously
//! persisted catalog and translation-id set, producing the next state. The
//! engine is pure: persistence is the caller's concern.

use std::collections::HashSet;

use katalog_core::{Catalog, CatalogSchema, Field, FieldValue, Product, TranslatedIds, Variant};
use katalog_feed::FeedError;
use katalog_translate::{translate_text, Translator};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::{convert_price, PriceConversion};

#[derive(Debug, Error)]
pub enum MergeError {
    /// The candidate stream failed; no state may be persisted.
    #[error("source feed failed after {candidates_seen} product(s): {source}")]
    Source {
        candidates_seen: usize,
        #[source]
        source: FeedError,
    },
}

/// Persisted state consumed and produced by one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeState {
    pub catalog: Catalog,
    pub translated_ids: TranslatedIds,
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// TRY to USD rate applied to every variant price.
    pub rate: Decimal,
    /// Keep already-translated prior products instead of dropping them
    /// once their id is recorded.
    pub retain_translated_history: bool,
}

/// Counters describing one merge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub candidates_seen: usize,
    pub merged: usize,
    pub duplicates_skipped: usize,
    /// Products whose text was translated without any fallback.
    pub translated: usize,
    /// Individual field translations that kept the original text.
    pub translation_fallbacks: usize,
    pub prices_converted: usize,
    pub prices_unparsed: usize,
    pub carried_forward: usize,
}

#[derive(Debug)]
pub enum MergeOutcome {
    Merged {
        state: MergeState,
        report: MergeReport,
    },
    /// No candidate survived duplicate suppression; nothing should be written.
    NoChanges { report: MergeReport },
}

impl MergeOutcome {
    #[must_use]
    pub fn report(&self) -> &MergeReport {
        match self {
            Self::Merged { report, .. } | Self::NoChanges { report } => report,
        }
    }
}

/// Merges `candidates` into `prior`.
///
/// New products come first in feed order, followed by the prior products
/// that are carried forward. A candidate sharing any barcode with a prior
/// product, or with a candidate merged earlier in this batch, is skipped.
/// Candidates whose translation id is absent from the prior id set have
/// their translatable fields passed through `translator`; every variant
/// price is converted at `options.rate`.
///
/// # Errors
///
/// Returns [`MergeError::Source`] on the first failed candidate. Nothing
/// from a failed run should be persisted.
pub async fn merge_catalog<I, T>(
    candidates: I,
    prior: MergeState,
    translator: &T,
    schema: &CatalogSchema,
    options: &MergeOptions,
) -> Result<MergeOutcome, MergeError>
where
    I: IntoIterator<Item = Result<Product, FeedError>>,
    T: Translator,
{
    let mut report = MergeReport::default();
    let mut seen_barcodes: HashSet<String> = prior
        .catalog
        .products
        .iter()
        .flat_map(|p| p.barcodes(schema))
        .map(str::to_owned)
        .collect();
    let mut updated_ids = prior.translated_ids.clone();
    let mut merged_ids: HashSet<String> = HashSet::new();
    let mut products = Vec::new();

    for candidate in candidates {
        let product = candidate.map_err(|source| MergeError::Source {
            candidates_seen: report.candidates_seen,
            source,
        })?;
        report.candidates_seen += 1;

        let barcodes: Vec<String> = product
            .barcodes(schema)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if let Some(dup) = barcodes.iter().find(|b| seen_barcodes.contains(b.as_str())) {
            tracing::debug!(barcode = %dup, "skipping product already in catalog");
            report.duplicates_skipped += 1;
            continue;
        }

        let id = product.translation_id(schema).map(str::to_owned);
        let translate = id
            .as_deref()
            .is_some_and(|id| !prior.translated_ids.contains(id));

        let mut ctx = ProductContext {
            translator,
            schema,
            rate: options.rate,
            translate,
            fallbacks: 0,
            report: &mut report,
        };
        let product = ctx.transform(product).await;
        let fallbacks = ctx.fallbacks;

        if let Some(id) = id {
            if translate {
                if fallbacks == 0 {
                    report.translated += 1;
                    updated_ids.insert(id.clone());
                } else {
                    tracing::warn!(
                        translation_id = %id,
                        fallbacks,
                        "product kept untranslated text; id not recorded"
                    );
                }
            }
            merged_ids.insert(id);
        }

        seen_barcodes.extend(barcodes);
        products.push(product);
        report.merged += 1;
    }

    if report.merged == 0 {
        tracing::info!(
            candidates_seen = report.candidates_seen,
            duplicates_skipped = report.duplicates_skipped,
            "no new products to merge"
        );
        return Ok(MergeOutcome::NoChanges { report });
    }

    for product in prior.catalog.products {
        let carry = match product.translation_id(schema) {
            None => true,
            Some(id) if options.retain_translated_history => !merged_ids.contains(id),
            Some(id) => !updated_ids.contains(id),
        };
        if carry {
            report.carried_forward += 1;
            products.push(product);
        }
    }

    Ok(MergeOutcome::Merged {
        state: MergeState {
            catalog: Catalog { products },
            translated_ids: updated_ids,
        },
        report,
    })
}

/// Per-candidate transformation settings and tallies.
struct ProductContext<'a, T> {
    translator: &'a T,
    schema: &'a CatalogSchema,
    rate: Decimal,
    translate: bool,
    fallbacks: usize,
    report: &'a mut MergeReport,
}

impl<T: Translator> ProductContext<'_, T> {
    async fn transform(&mut self, product: Product) -> Product {
        let mut fields = Vec::with_capacity(product.fields.len());
        for field in product.fields {
            let value = match field.value {
                FieldValue::Text(text)
                    if self.translate && self.schema.is_translatable_field(&field.name) =>
                {
                    FieldValue::Text(self.translate_field(&text).await)
                }
                FieldValue::Variants(variants) => {
                    let mut out = Vec::with_capacity(variants.len());
                    for variant in variants {
                        out.push(self.transform_variant(variant).await);
                    }
                    FieldValue::Variants(out)
                }
                other => other,
            };
            fields.push(Field {
                name: field.name,
                value,
            });
        }
        Product { fields }
    }

    async fn transform_variant(&mut self, mut variant: Variant) -> Variant {
        for field in &mut variant.fields {
            if field.name == self.schema.price_tag {
                match convert_price(&field.value, self.rate) {
                    PriceConversion::Converted(usd) => {
                        self.report.prices_converted += 1;
                        field.value = usd;
                    }
                    PriceConversion::Unparsed(_) => {
                        tracing::debug!(price = %field.value, "price is not numeric, keeping text");
                        self.report.prices_unparsed += 1;
                    }
                }
            } else if self.translate && self.schema.is_translatable_variant_field(&field.name) {
                field.value = self.translate_field(&field.value).await;
            }
        }
        variant
    }

    async fn translate_field(&mut self, text: &str) -> String {
        let translation = translate_text(self.translator, text).await;
        if translation.is_fallback() {
            self.fallbacks += 1;
            self.report.translation_fallbacks += 1;
        }
        translation.into_text()
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
