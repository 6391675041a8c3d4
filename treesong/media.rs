use crate::error::App;
use log::{error, info};
use reqwest::header::{ACCEPT, RANGE};
use reqwest::Client;
use serde::Deserialize;
use tokio::time::{sleep, Duration};

fn default_audio_path() -> String {
    "/audio".to_string()
}

fn default_image_path() -> String {
    "/image".to_string()
}

/// Base locations of the media bucket. Everything that turns a file
/// name from the content tables into a playable URL goes through here.
#[derive(Deserialize, Clone, Debug)]
pub struct MediaConfig {
    pub base_url: String,
    #[serde(default = "default_audio_path")]
    pub audio_path: String,
    #[serde(default = "default_image_path")]
    pub image_path: String,
}

impl MediaConfig {
    #[must_use]
    pub fn audio_url(&self, filename: &str) -> String {
        format!("{}{}/{}", self.base_url, self.audio_path, filename)
    }

    #[must_use]
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}{}/{}", self.base_url, self.image_path, filename)
    }

    /// Rows sometimes carry absolute URLs already; pass those through
    /// and only prefix bucket-relative paths.
    #[must_use]
    pub fn resolve(&self, src: &str) -> String {
        if src.starts_with("http") {
            src.to_string()
        } else {
            format!("{}{}", self.base_url, src)
        }
    }
}

pub async fn verify_stream_url(client: &Client, url: &str) -> Result<bool, App> {
    let response = client
        .get(url)
        .header(ACCEPT, "*/*")
        .header(RANGE, "bytes=0-1024")
        .send()
        .await
        .map_err(|e| App::Network(e.to_string()))?;

    Ok(response.status().is_success())
}

/// Probes the stream URL before the pipeline is built, with bounded
/// retries.
pub async fn ensure_stream_available(client: &Client, url: &str) -> Result<(), App> {
    const MAX_RETRIES: u32 = 3;
    const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
    let mut retry_delay = INITIAL_RETRY_DELAY;

    for attempt in 1..=MAX_RETRIES {
        match verify_stream_url(client, url).await {
            Ok(true) => return Ok(()),
            Ok(false) => {
                info!("Verification failed for URL: {}", url);
            }
            Err(e) => {
                error!("Error verifying URL: {}", e);
            }
        }
        if attempt < MAX_RETRIES {
            info!("Retrying... Attempt {}/{}", attempt, MAX_RETRIES);
            sleep(retry_delay).await;
            retry_delay *= 2;
        }
    }

    Err(App::Fetch(format!(
        "Max retries reached while verifying stream URL: {url}"
    )))
}

#[cfg(test)]
mod tests {
    use super::MediaConfig;

    fn config() -> MediaConfig {
        MediaConfig {
            base_url: "https://trees-media.nyc3.digitaloceanspaces.com".to_string(),
            audio_path: "/audio".to_string(),
            image_path: "/image".to_string(),
        }
    }

    #[test]
    fn audio_url_joins_base_path_and_filename() {
        assert_eq!(
            config().audio_url("Novelist-Maine-001.mp3"),
            "https://trees-media.nyc3.digitaloceanspaces.com/audio/Novelist-Maine-001.mp3"
        );
    }

    #[test]
    fn image_url_uses_image_path() {
        assert_eq!(
            config().image_url("oak.webp"),
            "https://trees-media.nyc3.digitaloceanspaces.com/image/oak.webp"
        );
    }

    #[test]
    fn resolve_passes_absolute_urls_through() {
        assert_eq!(
            config().resolve("https://elsewhere.example/ep.mp3"),
            "https://elsewhere.example/ep.mp3"
        );
    }

    #[test]
    fn resolve_prefixes_relative_paths() {
        assert_eq!(
            config().resolve("/audio/ep.mp3"),
            "https://trees-media.nyc3.digitaloceanspaces.com/audio/ep.mp3"
        );
    }
}
