//! HTTP client that downloads the vendor XML feed to a local file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;

use crate::error::FeedError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Downloads the raw vendor feed.
///
/// The vendor endpoint can take many minutes to render, so the request
/// timeout is configured separately from the short collaborator timeouts.
/// There is no retry: a failed download leaves the previous raw file intact.
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Streams the body of `url` into `dest`, returning the number of bytes
    /// written.
    ///
    /// Leading whitespace and a UTF-8 byte order mark are stripped so the
    /// file starts with the XML declaration or root element. The body goes
    /// to a temporary sibling file that is renamed over `dest` only after
    /// the whole response arrived.
    ///
    /// # Errors
    ///
    /// - [`FeedError::UnexpectedStatus`] for any non-2xx response.
    /// - [`FeedError::Http`] on network failure or timeout.
    /// - [`FeedError::Io`] if the file cannot be written.
    pub async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, FeedError> {
        let mut response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "application/xml,text/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let tmp = tmp_path(dest);
        let mut file = std::io::BufWriter::new(std::fs::File::create(&tmp)?);
        let mut written = 0u64;
        let mut at_start = true;

        let result = async {
            while let Some(chunk) = response.chunk().await? {
                let mut bytes: &[u8] = &chunk;
                if at_start {
                    bytes = strip_leading(bytes);
                    if bytes.is_empty() {
                        continue;
                    }
                    at_start = false;
                }
                file.write_all(bytes)?;
                written += bytes.len() as u64;
            }
            file.flush()?;
            Ok::<(), FeedError>(())
        }
        .await;

        if let Err(e) = result {
            drop(file);
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove partial download");
            }
            return Err(e);
        }

        drop(file);
        std::fs::rename(&tmp, dest)?;
        tracing::info!(url, path = %dest.display(), bytes = written, "feed downloaded");
        Ok(written)
    }
}

fn strip_leading(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn tmp_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_leading_removes_bom_and_whitespace() {
        assert_eq!(strip_leading(b"\xEF\xBB\xBF \n<Root/>"), b"<Root/>");
        assert_eq!(strip_leading(b"\n\t<Root/>"), b"<Root/>");
        assert_eq!(strip_leading(b"   "), b"");
    }

    #[test]
    fn tmp_path_is_a_sibling() {
        let tmp = tmp_path(Path::new("/data/feed.xml"));
        assert_eq!(tmp, PathBuf::from("/data/feed.xml.part"));
    }
}
