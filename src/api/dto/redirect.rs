//! DTO for `GET /r/{shortUrl}` and `GET /api/info/{shortUrl}` (spec §6).

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    #[serde(rename = "originalUrl")]
    pub original_url: String,
}
