use crate::error::LoadError;

/// Fetch a dataset body over HTTP(S).
pub async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let fetch_err = |source: reqwest::Error| LoadError::Fetch {
        url: url.to_owned(),
        source: source.into(),
    };

    let resp = reqwest::get(url).await.map_err(fetch_err)?;
    let resp = resp.error_for_status().map_err(fetch_err)?;
    resp.text().await.map_err(fetch_err)
}
