use std::cell::RefCell;

use katalog_core::TextField;
use katalog_translate::TranslateError;

use super::*;

/// Prefixes text with `EN:` and records every call.
#[derive(Default)]
struct FakeTranslator {
    calls: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl FakeTranslator {
    fn failing_on(text: &'static str) -> Self {
        Self {
            fail_on: Some(text),
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Translator for FakeTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        self.calls.borrow_mut().push(text.to_owned());
        if self.fail_on == Some(text) {
            return Err(TranslateError::EmptyResponse);
        }
        Ok(format!("EN:{text}"))
    }
}

fn leaf(name: &str, value: &str) -> Field {
    Field {
        name: name.to_string(),
        value: FieldValue::Text(value.to_string()),
    }
}

fn variant(id: &str, barcode: &str, price: &str) -> Variant {
    Variant {
        fields: vec![
            TextField::new("VaryasyonID", id),
            TextField::new("Barkod", barcode),
            TextField::new("SatisFiyati", price),
            TextField::new("EkSecenekOzellik", "Beden: S"),
        ],
    }
}

fn product(name: &str, variants: Vec<Variant>) -> Product {
    Product {
        fields: vec![
            leaf("UrunKodu", "K-1"),
            leaf("UrunAdi", name),
            leaf("Aciklama", "Pamuklu"),
            Field {
                name: "UrunSecenek".to_string(),
                value: FieldValue::Variants(variants),
            },
        ],
    }
}

fn ok(products: Vec<Product>) -> Vec<Result<Product, FeedError>> {
    products.into_iter().map(Ok).collect()
}

fn options() -> MergeOptions {
    MergeOptions {
        rate: Decimal::new(3, 2),
        retain_translated_history: false,
    }
}

async fn merge(
    candidates: Vec<Product>,
    prior: MergeState,
    translator: &FakeTranslator,
    options: &MergeOptions,
) -> MergeOutcome {
    merge_catalog(
        ok(candidates),
        prior,
        translator,
        &CatalogSchema::default(),
        options,
    )
    .await
    .expect("merge should succeed")
}

fn expect_merged(outcome: MergeOutcome) -> (MergeState, MergeReport) {
    match outcome {
        MergeOutcome::Merged { state, report } => (state, report),
        MergeOutcome::NoChanges { report } => panic!("expected a merge, got no changes: {report:?}"),
    }
}

fn price_of(product: &Product) -> Option<&str> {
    product.variants().next().and_then(|v| v.get("SatisFiyati"))
}

// ---------------------------------------------------------------------------
// Basic merge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_run_translates_converts_and_records_id() {
    let translator = FakeTranslator::default();
    let outcome = merge(
        vec![product("Elbise", vec![variant("V1", "B1", "100")])],
        MergeState::default(),
        &translator,
        &options(),
    )
    .await;

    let (state, report) = expect_merged(outcome);
    assert_eq!(state.catalog.len(), 1);
    let p = &state.catalog.products[0];
    assert_eq!(p.text("UrunAdi"), Some("EN:Elbise"));
    assert_eq!(p.text("Aciklama"), Some("EN:Pamuklu"));
    assert_eq!(p.text("UrunKodu"), Some("K-1"));
    assert_eq!(price_of(p), Some("3.0"));
    assert_eq!(
        p.variants().next().unwrap().get("EkSecenekOzellik"),
        Some("EN:Beden: S")
    );
    assert!(state.translated_ids.contains("V1"));
    assert_eq!(state.translated_ids.len(), 1);

    assert_eq!(report.merged, 1);
    assert_eq!(report.translated, 1);
    assert_eq!(report.prices_converted, 1);
    assert_eq!(translator.call_count(), 3);
}

#[tokio::test]
async fn second_run_with_same_input_changes_nothing() {
    let translator = FakeTranslator::default();
    let input = || vec![product("Elbise", vec![variant("V1", "B1", "100")])];

    let (state, _) = expect_merged(
        merge(input(), MergeState::default(), &translator, &options()).await,
    );
    let outcome = merge(input(), state.clone(), &translator, &options()).await;

    match outcome {
        MergeOutcome::NoChanges { report } => {
            assert_eq!(report.candidates_seen, 1);
            assert_eq!(report.duplicates_skipped, 1);
            assert_eq!(report.merged, 0);
        }
        MergeOutcome::Merged { .. } => panic!("duplicate batch must not produce a merge"),
    }
    assert_eq!(translator.call_count(), 3, "second run must not translate");
    assert_eq!(state.catalog.len(), 1);
}

#[tokio::test]
async fn empty_batch_reports_no_changes() {
    let translator = FakeTranslator::default();
    let outcome = merge(vec![], MergeState::default(), &translator, &options()).await;
    assert!(matches!(outcome, MergeOutcome::NoChanges { .. }));
    assert_eq!(outcome.report().candidates_seen, 0);
}

// ---------------------------------------------------------------------------
// Translate-once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn already_translated_id_is_copied_verbatim() {
    let translator = FakeTranslator::default();
    let prior = MergeState {
        catalog: Catalog::default(),
        translated_ids: TranslatedIds::from_iter(["V1"]),
    };
    let (state, report) = expect_merged(
        merge(
            vec![product("Elbise", vec![variant("V1", "B9", "100")])],
            prior,
            &translator,
            &options(),
        )
        .await,
    );

    let p = &state.catalog.products[0];
    assert_eq!(p.text("UrunAdi"), Some("Elbise"));
    assert_eq!(
        p.variants().next().unwrap().get("EkSecenekOzellik"),
        Some("Beden: S")
    );
    assert_eq!(price_of(p), Some("3.0"), "prices are converted regardless");
    assert_eq!(translator.call_count(), 0);
    assert_eq!(report.translated, 0);
}

#[tokio::test]
async fn product_without_id_is_merged_untranslated() {
    let translator = FakeTranslator::default();
    let (state, report) = expect_merged(
        merge(
            vec![product("Elbise", vec![variant("  ", "B1", "100")])],
            MergeState::default(),
            &translator,
            &options(),
        )
        .await,
    );

    assert_eq!(state.catalog.products[0].text("UrunAdi"), Some("Elbise"));
    assert!(state.translated_ids.is_empty());
    assert_eq!(report.merged, 1);
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn translation_fallback_keeps_text_and_skips_id() {
    let translator = FakeTranslator::failing_on("Pamuklu");
    let (state, report) = expect_merged(
        merge(
            vec![product("Elbise", vec![variant("V1", "B1", "100")])],
            MergeState::default(),
            &translator,
            &options(),
        )
        .await,
    );

    let p = &state.catalog.products[0];
    assert_eq!(p.text("UrunAdi"), Some("EN:Elbise"));
    assert_eq!(p.text("Aciklama"), Some("Pamuklu"));
    assert!(!state.translated_ids.contains("V1"));
    assert_eq!(report.translation_fallbacks, 1);
    assert_eq!(report.translated, 0);
    assert_eq!(report.merged, 1);
}

#[tokio::test]
async fn blank_fields_are_not_sent_to_translator() {
    let translator = FakeTranslator::default();
    let mut p = product("Elbise", vec![variant("V1", "B1", "100")]);
    p.fields.push(leaf("MateryalBileseni", "   "));

    let (state, _) = expect_merged(
        merge(vec![p], MergeState::default(), &translator, &options()).await,
    );
    assert_eq!(
        state.catalog.products[0].text("MateryalBileseni"),
        Some("   ")
    );
    assert_eq!(translator.call_count(), 3);
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unparsable_price_passes_through() {
    let translator = FakeTranslator::default();
    let (state, report) = expect_merged(
        merge(
            vec![product(
                "Elbise",
                vec![variant("V1", "B1", "sorunuz"), variant("V1", "B2", "250")],
            )],
            MergeState::default(),
            &translator,
            &MergeOptions {
                rate: Decimal::new(5, 2),
                retain_translated_history: false,
            },
        )
        .await,
    );

    let prices: Vec<&str> = state.catalog.products[0]
        .variants()
        .filter_map(|v| v.get("SatisFiyati"))
        .collect();
    assert_eq!(prices, vec!["sorunuz", "12.5"]);
    assert_eq!(report.prices_unparsed, 1);
    assert_eq!(report.prices_converted, 1);
}

// ---------------------------------------------------------------------------
// Duplicate suppression and carry-forward
// ---------------------------------------------------------------------------

#[tokio::test]
async fn barcodes_repeated_within_batch_are_skipped() {
    let translator = FakeTranslator::default();
    let (state, report) = expect_merged(
        merge(
            vec![
                product("Elbise", vec![variant("V1", "B1", "100")]),
                product("Gömlek", vec![variant("V2", "B2", "100"), variant("V2", "B1", "100")]),
            ],
            MergeState::default(),
            &translator,
            &options(),
        )
        .await,
    );

    assert_eq!(state.catalog.len(), 1);
    assert_eq!(report.duplicates_skipped, 1);
    assert!(!state.translated_ids.contains("V2"));
}

#[tokio::test]
async fn carry_forward_drops_translated_prior_products() {
    let translator = FakeTranslator::default();
    let prior_products = vec![
        product("Eski çevrilmiş", vec![variant("V-OLD", "B-OLD", "3.0")]),
        product("Eski çevrilmemiş", vec![variant("V-RAW", "B-RAW", "3.0")]),
        product("Kimliksiz", vec![variant("", "B-NOID", "3.0")]),
    ];
    let prior = MergeState {
        catalog: Catalog {
            products: prior_products.clone(),
        },
        translated_ids: TranslatedIds::from_iter(["V-OLD"]),
    };

    let (state, report) = expect_merged(
        merge(
            vec![product("Yeni", vec![variant("V-NEW", "B-NEW", "100")])],
            prior,
            &translator,
            &options(),
        )
        .await,
    );

    let names: Vec<&str> = state
        .catalog
        .products
        .iter()
        .filter_map(|p| p.text("UrunAdi"))
        .collect();
    assert_eq!(names, vec!["EN:Yeni", "Eski çevrilmemiş", "Kimliksiz"]);
    assert_eq!(state.catalog.products[1], prior_products[1]);
    assert_eq!(report.carried_forward, 2);
    assert_eq!(
        state.translated_ids,
        TranslatedIds::from_iter(["V-NEW", "V-OLD"])
    );
}

#[tokio::test]
async fn retain_history_keeps_prior_translated_products() {
    let translator = FakeTranslator::default();
    let prior = MergeState {
        catalog: Catalog {
            products: vec![
                product("Eski", vec![variant("V-OLD", "B-OLD", "3.0")]),
                product("Değişen", vec![variant("V-NEW", "B-GONE", "3.0")]),
            ],
        },
        translated_ids: TranslatedIds::from_iter(["V-OLD"]),
    };
    let opts = MergeOptions {
        retain_translated_history: true,
        ..options()
    };

    let (state, report) = expect_merged(
        merge(
            vec![product("Yeni", vec![variant("V-NEW", "B-NEW", "100")])],
            prior,
            &translator,
            &opts,
        )
        .await,
    );

    let names: Vec<&str> = state
        .catalog
        .products
        .iter()
        .filter_map(|p| p.text("UrunAdi"))
        .collect();
    assert_eq!(names, vec!["EN:Yeni", "Eski"]);
    assert_eq!(report.carried_forward, 1);
}

#[tokio::test]
async fn prior_products_appear_exactly_once() {
    let translator = FakeTranslator::default();
    let prior = MergeState {
        catalog: Catalog {
            products: vec![product("Eski", vec![variant("", "B-OLD", "3.0")])],
        },
        translated_ids: TranslatedIds::new(),
    };
    let (state, _) = expect_merged(
        merge(
            vec![
                product("Eski", vec![variant("", "B-OLD", "100")]),
                product("Yeni", vec![variant("V2", "B2", "100")]),
            ],
            prior,
            &translator,
            &options(),
        )
        .await,
    );

    let old = state
        .catalog
        .products
        .iter()
        .filter(|p| p.text("UrunAdi") == Some("Eski"))
        .count();
    assert_eq!(old, 1);
    assert_eq!(state.catalog.len(), 2);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn source_failure_aborts_the_merge() {
    let translator = FakeTranslator::default();
    let candidates = vec![
        Ok(product("Elbise", vec![variant("V1", "B1", "100")])),
        Err(FeedError::Malformed {
            reason: "document ended inside <Urun>".to_string(),
        }),
    ];

    let err = merge_catalog(
        candidates,
        MergeState::default(),
        &translator,
        &CatalogSchema::default(),
        &options(),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, MergeError::Source { candidates_seen: 1, .. }),
        "unexpected error: {err:?}"
    );
}
