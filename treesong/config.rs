use crate::error::App;
use crate::media::MediaConfig;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

fn default_api_base() -> String {
    "https://api.baserow.io/api".to_string()
}

fn default_trigger_object() -> String {
    "PlayButton".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct BaserowConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub token: String,
    pub content_table: u64,
    pub design_table: Option<u64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PlayerConfig {
    #[serde(default)]
    pub repeat: bool,
    /// Name of the scene object whose clicks toggle playback.
    #[serde(default = "default_trigger_object")]
    pub trigger_object: String,
    /// Optional episode selector, matched against the mp3 file name or
    /// the episode title. First playable episode when absent.
    pub episode: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            repeat: false,
            trigger_object: default_trigger_object(),
            episode: None,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub baserow: BaserowConfig,
    pub media: MediaConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

pub async fn load(path: &str) -> Result<Config, App> {
    if !Path::new(path).exists() {
        return Err(App::Config(format!(
            "Config file not found: {path}. It must provide the Baserow token and table ids."
        )));
    }
    let content = fs::read_to_string(path).await?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            [baserow]
            api_base = "https://baserow.internal/api"
            token = "secret"
            content_table = 737803
            design_table = 737901

            [media]
            base_url = "https://trees-media.nyc3.digitaloceanspaces.com"

            [player]
            repeat = true
            trigger_object = "Cylinder"
            episode = "Novelist-Maine-001.mp3"
            "#,
        )
        .unwrap();

        assert_eq!(config.baserow.api_base, "https://baserow.internal/api");
        assert_eq!(config.baserow.content_table, 737_803);
        assert_eq!(config.baserow.design_table, Some(737_901));
        assert!(config.player.repeat);
        assert_eq!(config.player.trigger_object, "Cylinder");
        assert_eq!(
            config.player.episode.as_deref(),
            Some("Novelist-Maine-001.mp3")
        );
        assert_eq!(config.media.audio_path, "/audio");
    }

    #[test]
    fn player_section_is_optional_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [baserow]
            token = "secret"
            content_table = 1

            [media]
            base_url = "https://media.example"
            "#,
        )
        .unwrap();

        assert_eq!(config.baserow.api_base, "https://api.baserow.io/api");
        assert_eq!(config.baserow.design_table, None);
        assert!(!config.player.repeat);
        assert_eq!(config.player.trigger_object, "PlayButton");
        assert!(config.player.episode.is_none());
    }
}
