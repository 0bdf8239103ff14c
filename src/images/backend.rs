use super::error::Result;

/// Something that can turn a keyword into an image URL.
///
/// Implementations are shared across the pre-generation worker pool, hence
/// `Send + Sync`. Every call should produce a fresh image.
pub trait ImageBackend: Send + Sync {
    fn generate(&self, keyword: &str) -> Result<String>;
}

impl<F> ImageBackend for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn generate(&self, keyword: &str) -> Result<String> {
        self(keyword)
    }
}

/// Cache key for a keyword: trimmed and lower-cased.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

#[cfg(feature = "http-backend")]
pub use http::HttpImageBackend;

#[cfg(feature = "http-backend")]
mod http {
    use super::{normalize_keyword, ImageBackend};
    use crate::images::error::{ImageError, Result};
    use base64::Engine;
    use reqwest::blocking::Client;
    use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Debug)]
    struct GenerateRequest<'a> {
        prompt: &'a str,
        is_logo: bool,
    }

    #[derive(Deserialize, Debug)]
    struct GenerateResponse {
        image_url: Option<String>,
        url: Option<String>,
    }

    /// Posts `{prompt, is_logo}` to an image generation endpoint.
    ///
    /// The endpoint may answer with raw `image/*` bytes, which are returned as a
    /// base64 data URL, or with JSON carrying `image_url`.
    #[derive(Debug, Clone)]
    pub struct HttpImageBackend {
        client: Client,
        endpoint: String,
        api_key: Option<String>,
    }

    impl HttpImageBackend {
        pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
            HttpImageBackend {
                client: Client::new(),
                endpoint: endpoint.into(),
                api_key,
            }
        }

        pub fn with_client(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
            HttpImageBackend {
                client,
                endpoint: endpoint.into(),
                api_key,
            }
        }
    }

    impl ImageBackend for HttpImageBackend {
        fn generate(&self, keyword: &str) -> Result<String> {
            let keyword = normalize_keyword(keyword);
            if keyword.is_empty() {
                return Err(ImageError::EmptyKeyword);
            }
            log::info!("Generating image for keyword '{}'", keyword);

            let mut request = self
                .client
                .post(&self.endpoint)
                .header(ACCEPT, "image/*, application/json")
                .json(&GenerateRequest {
                    prompt: &keyword,
                    is_logo: false,
                });
            if let Some(key) = &self.api_key {
                request = request.header(AUTHORIZATION, format!("Bearer {}", key));
            }
            let response = request.send()?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().unwrap_or_default();
                return Err(ImageError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.split(';').next().unwrap_or(v).trim().to_lowercase())
                .unwrap_or_default();

            if content_type.starts_with("image/") {
                let bytes = response.bytes()?;
                if bytes.is_empty() {
                    return Err(ImageError::InvalidResponse("empty image body".to_string()));
                }
                let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
                return Ok(format!("data:{};base64,{}", content_type, encoded));
            }

            let body = response.bytes()?;
            let parsed: GenerateResponse = serde_json::from_slice(&body).map_err(|e| {
                ImageError::InvalidResponse(format!("expected JSON with image_url: {}", e))
            })?;
            parsed
                .image_url
                .or(parsed.url)
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| ImageError::InvalidResponse("response has no image_url".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_backends() {
        let backend = |keyword: &str| -> Result<String> { Ok(format!("https://img/{}", keyword)) };
        assert_eq!(backend.generate("shield").unwrap(), "https://img/shield");
    }

    #[test]
    fn keywords_are_normalized() {
        assert_eq!(normalize_keyword("  Shield Icon "), "shield icon");
    }
}
