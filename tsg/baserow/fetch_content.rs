use crate::error::App;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct RowPage<T> {
    results: Vec<T>,
}

/// Content row as the CLI displays it: the FAQ text plus whichever
/// episode slots are filled in.
#[derive(Deserialize, Clone)]
pub struct FaqRow {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub text_block: String,
    #[serde(default)]
    pub caption_main: String,
    #[serde(default)]
    pub display_order: String,
    #[serde(default)]
    pub episode_1_title: Option<String>,
    #[serde(default)]
    pub episode_1_body: Option<String>,
    #[serde(default)]
    pub episode_1_mp3: String,
    #[serde(default)]
    pub episode_2_title: Option<String>,
    #[serde(default)]
    pub episode_2_body: Option<String>,
    #[serde(default)]
    pub episode_2_mp3: String,
    #[serde(default)]
    pub episode_3_title: Option<String>,
    #[serde(default)]
    pub episode_3_body: Option<String>,
    #[serde(default)]
    pub episode_3_mp3: String,
}

impl FaqRow {
    /// (title, body, mp3 file) for every slot carrying audio.
    #[must_use]
    pub fn episode_listing(&self) -> Vec<(String, String, String)> {
        [
            (
                self.episode_1_title.as_deref(),
                self.episode_1_body.as_deref(),
                self.episode_1_mp3.as_str(),
            ),
            (
                self.episode_2_title.as_deref(),
                self.episode_2_body.as_deref(),
                self.episode_2_mp3.as_str(),
            ),
            (
                self.episode_3_title.as_deref(),
                self.episode_3_body.as_deref(),
                self.episode_3_mp3.as_str(),
            ),
        ]
        .into_iter()
        .enumerate()
        .filter(|(_, (_, _, mp3))| !mp3.is_empty())
        .map(|(i, (title, body, mp3))| {
            (
                title.map_or_else(|| format!("Episode {}", i + 1), str::to_string),
                body.unwrap_or_default().to_string(),
                mp3.to_string(),
            )
        })
        .collect()
    }
}

/// Row of the design-values table, driving the site's CSS variables.
#[derive(Deserialize, Clone)]
pub struct DesignRow {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

#[derive(Deserialize, Clone)]
pub struct FieldInfo {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

#[must_use]
pub fn published_sorted(mut rows: Vec<FaqRow>) -> Vec<FaqRow> {
    rows.retain(|row| !row.display_order.trim().is_empty());
    rows.sort_by_key(|row| row.display_order.trim().parse::<i64>().unwrap_or(i64::MAX));
    rows
}

/// Maps design rows to CSS custom-property pairs the way the site
/// injects them: names lowercased with whitespace collapsed to dashes.
#[must_use]
pub fn css_variables(rows: &[DesignRow]) -> Vec<(String, String)> {
    rows.iter()
        .filter(|row| !row.name.trim().is_empty())
        .map(|row| {
            let key = row
                .name
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-");
            (key, row.value.clone())
        })
        .collect()
}

pub async fn fetch_rows<T: DeserializeOwned>(
    client: &Client,
    api_base: &str,
    token: &str,
    table_id: u64,
) -> Result<Vec<T>, App> {
    let url = format!("{api_base}/database/rows/table/{table_id}/?user_field_names=true");
    let response = client
        .get(&url)
        .header(AUTHORIZATION, format!("Token {token}"))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(App::DataParsing(format!(
            "Baserow API error: {}",
            response.status()
        )));
    }
    let page: RowPage<T> = response.json().await?;
    Ok(page.results)
}

pub async fn fetch_fields(
    client: &Client,
    api_base: &str,
    token: &str,
    table_id: u64,
) -> Result<Vec<FieldInfo>, App> {
    let url = format!("{api_base}/database/fields/table/{table_id}/");
    let response = client
        .get(&url)
        .header(AUTHORIZATION, format!("Token {token}"))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(App::DataParsing(format!(
            "Baserow API error: {}",
            response.status()
        )));
    }
    let fields: Vec<FieldInfo> = response.json().await?;
    Ok(fields)
}
