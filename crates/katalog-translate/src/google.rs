//! Client for the public Google translate endpoint.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::TranslateError;
use crate::translator::Translator;

/// Upper bound on characters per request; longer texts are rejected so
/// the caller keeps the original.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Translates text through `translate_a/single?client=gtx`.
///
/// One request per text. The response is a nested JSON array whose first
/// element lists `[translated, original, ..]` segments; the translation is
/// the concatenation of every segment's first entry.
pub struct GoogleTranslator {
    client: Client,
    url: String,
    source_lang: String,
    target_lang: String,
}

impl GoogleTranslator {
    /// # Errors
    ///
    /// Returns [`TranslateError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        url: &str,
        source_lang: &str,
        target_lang: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
            source_lang: source_lang.to_owned(),
            target_lang: target_lang.to_owned(),
        })
    }

    async fn request(&self, text: &str) -> Result<String, TranslateError> {
        let len = text.chars().count();
        if len > MAX_TEXT_CHARS {
            return Err(TranslateError::TextTooLong {
                len,
                max: MAX_TEXT_CHARS,
            });
        }

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        let payload: Value =
            serde_json::from_str(&body).map_err(|source| TranslateError::Deserialize {
                context: "translate response".to_string(),
                source,
            })?;
        join_segments(&payload)
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        self.request(text).await
    }
}

fn join_segments(payload: &Value) -> Result<String, TranslateError> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or(TranslateError::EmptyResponse)?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(TranslateError::EmptyResponse);
    }
    Ok(translated)
}
