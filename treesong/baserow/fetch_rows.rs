use crate::config::BaserowConfig;
use crate::error::App;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct RowPage<T> {
    results: Vec<T>,
}

/// Row of the content table. One row is a FAQ entry with up to three
/// episode slots attached, mirroring the table layout in Baserow.
#[derive(Deserialize, Clone, Debug)]
pub struct FaqRow {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub text_block: String,
    #[serde(default)]
    pub media_url_main: String,
    #[serde(default)]
    pub caption_main: String,
    #[serde(default)]
    pub display_order: String,
    #[serde(default)]
    pub episode_1_title: Option<String>,
    #[serde(default)]
    pub episode_1_body: Option<String>,
    #[serde(default)]
    pub episode_1_image: String,
    #[serde(default)]
    pub episode_1_mp3: String,
    #[serde(default)]
    pub episode_2_title: Option<String>,
    #[serde(default)]
    pub episode_2_body: Option<String>,
    #[serde(default)]
    pub episode_2_image: String,
    #[serde(default)]
    pub episode_2_mp3: String,
    #[serde(default)]
    pub episode_3_title: Option<String>,
    #[serde(default)]
    pub episode_3_body: Option<String>,
    #[serde(default)]
    pub episode_3_image: String,
    #[serde(default)]
    pub episode_3_mp3: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub body: String,
    pub image: String,
    pub mp3: String,
}

impl FaqRow {
    /// Flattens the three episode slots into the ones actually filled
    /// in. A slot counts as filled when it carries an image or an mp3.
    #[must_use]
    pub fn episodes(&self) -> Vec<Episode> {
        let slots = [
            (
                self.episode_1_title.as_deref(),
                self.episode_1_body.as_deref(),
                self.episode_1_image.as_str(),
                self.episode_1_mp3.as_str(),
            ),
            (
                self.episode_2_title.as_deref(),
                self.episode_2_body.as_deref(),
                self.episode_2_image.as_str(),
                self.episode_2_mp3.as_str(),
            ),
            (
                self.episode_3_title.as_deref(),
                self.episode_3_body.as_deref(),
                self.episode_3_image.as_str(),
                self.episode_3_mp3.as_str(),
            ),
        ];

        slots
            .into_iter()
            .enumerate()
            .filter_map(|(i, (title, body, image, mp3))| {
                if image.is_empty() && mp3.is_empty() {
                    return None;
                }
                Some(Episode {
                    title: title.map_or_else(|| format!("Episode {}", i + 1), str::to_string),
                    body: body.unwrap_or_default().to_string(),
                    image: image.to_string(),
                    mp3: mp3.to_string(),
                })
            })
            .collect()
    }
}

/// Keeps only rows marked for display and sorts them by their numeric
/// display order. Rows with an unparsable order sink to the end.
#[must_use]
pub fn published_sorted(mut rows: Vec<FaqRow>) -> Vec<FaqRow> {
    rows.retain(|row| !row.display_order.trim().is_empty());
    rows.sort_by_key(|row| row.display_order.trim().parse::<i64>().unwrap_or(i64::MAX));
    rows
}

#[must_use]
pub fn all_episodes(rows: &[FaqRow]) -> Vec<Episode> {
    rows.iter().flat_map(FaqRow::episodes).collect()
}

/// Picks the episode to bind the player to: the one matching the
/// configured selector (mp3 file name or title substring), otherwise
/// the first one that has audio at all.
#[must_use]
pub fn select_episode<'a>(episodes: &'a [Episode], selector: Option<&str>) -> Option<&'a Episode> {
    if let Some(selector) = selector {
        return episodes
            .iter()
            .find(|episode| episode.mp3 == selector || episode.title.contains(selector));
    }
    episodes.iter().find(|episode| !episode.mp3.is_empty())
}

pub struct Baserow {
    client: Client,
    api_base: String,
    token: String,
}

impl Baserow {
    #[must_use]
    pub fn new(client: Client, config: &BaserowConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
        }
    }

    pub async fn table_rows<T: DeserializeOwned>(&self, table_id: u64) -> Result<Vec<T>, App> {
        let url = format!(
            "{}/database/rows/table/{}/?user_field_names=true",
            self.api_base, table_id
        );
        log::info!("Fetching rows from table {table_id}");
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(App::Fetch(format!(
                "Baserow API error: {}",
                response.status()
            )));
        }
        let page: RowPage<T> = response.json().await?;
        Ok(page.results)
    }

    pub async fn content_rows(&self, table_id: u64) -> Result<Vec<FaqRow>, App> {
        Ok(published_sorted(self.table_rows(table_id).await?))
    }
}
