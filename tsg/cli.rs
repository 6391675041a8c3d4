mod baserow;
mod error;
mod text;

use baserow::fetch_content::{
    css_variables, fetch_fields, fetch_rows, published_sorted, DesignRow, FaqRow,
};
use clap::{Parser, Subcommand};
use error::App;
use serde::Deserialize;
use std::path::Path;
use tokio::{fs, process::Command};
use zbus::{proxy, Connection};

type StdResult<T> = std::result::Result<T, App>;

#[proxy(
    interface = "org.treesong.Player",
    default_service = "org.treesong.Player",
    default_path = "/org/treesong/Player"
)]
trait Player {
    async fn play(&self) -> zbus::Result<()>;
    async fn pause(&self) -> zbus::Result<()>;
    async fn toggle(&self) -> zbus::Result<()>;
    async fn seek(&self, secs: f64) -> zbus::Result<()>;
    async fn seek_percent(&self, pct: f64) -> zbus::Result<()>;
    async fn set_repeat(&self, repeat: bool) -> zbus::Result<()>;
    async fn trigger(&self, target: &str) -> zbus::Result<()>;
    async fn status(&self) -> zbus::Result<(bool, bool, f64, f64, f64)>;
    async fn stop(&self) -> zbus::Result<()>;
    async fn test_connection(&self) -> zbus::Result<()>;
}

#[derive(Parser)]
#[command(
    name = "tsg",
    about = "Control the treesong player and browse the site content.",
    version = "0.1.0"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Resume playback")]
    Play,

    #[command(about = "Pause playback")]
    Pause,

    #[command(about = "Toggle between play and pause")]
    Toggle,

    #[command(about = "Seek to a position in seconds")]
    Seek(SeekCommand),

    #[command(about = "Seek to a percentage of the track")]
    Percent(PercentCommand),

    #[command(about = "Turn repeat-at-end on or off")]
    Repeat(RepeatCommand),

    #[command(about = "Send a scene click event to the player")]
    Trigger(TriggerCommand),

    #[command(about = "Show the current playback state")]
    Status,

    #[command(about = "Stop treesong")]
    Stop,

    #[command(about = "Start treesong")]
    Start,

    #[command(about = "List episodes from the content table")]
    Episodes,

    #[command(about = "Show the FAQ entries from the content table")]
    Faq,

    #[command(about = "Show the design values as CSS variables")]
    Design,

    #[command(about = "List the fields of a table")]
    Fields(FieldsCommand),
}

#[derive(Parser)]
struct SeekCommand {
    #[arg(short = 't', long = "time", help = "Target position in seconds")]
    time: f64,
}

#[derive(Parser)]
struct PercentCommand {
    #[arg(short = 'p', long = "percent", help = "Target position in percent (0-100)")]
    percent: f64,
}

#[derive(Parser)]
struct RepeatCommand {
    #[arg(long = "on", action = clap::ArgAction::SetTrue, help = "Repeat the track when it ends")]
    on: bool,
    #[arg(long = "off", action = clap::ArgAction::SetTrue, help = "Stop at the end of the track")]
    off: bool,
}

#[derive(Parser)]
struct TriggerCommand {
    #[arg(short = 't', long = "target", help = "Name of the clicked scene object")]
    target: String,
}

#[derive(Parser)]
struct FieldsCommand {
    #[arg(short = 't', long = "table", help = "Table id to inspect")]
    table: u64,
}

fn default_api_base() -> String {
    "https://api.baserow.io/api".to_string()
}

fn default_audio_path() -> String {
    "/audio".to_string()
}

#[derive(Deserialize)]
struct BaserowCfg {
    #[serde(default = "default_api_base")]
    api_base: String,
    token: String,
    content_table: u64,
    design_table: Option<u64>,
}

#[derive(Deserialize)]
struct MediaCfg {
    base_url: String,
    #[serde(default = "default_audio_path")]
    audio_path: String,
}

impl MediaCfg {
    fn audio_url(&self, filename: &str) -> String {
        if filename.starts_with("http") {
            filename.to_string()
        } else {
            format!("{}{}/{}", self.base_url, self.audio_path, filename)
        }
    }
}

#[derive(Deserialize)]
struct Config {
    baserow: BaserowCfg,
    media: MediaCfg,
}

#[tokio::main]
async fn main() -> StdResult<()> {
    let cli = Cli::parse();
    let connection = Connection::session().await?;
    let proxy = PlayerProxy::new(&connection).await?;
    handle_command(cli, proxy).await
}

async fn handle_command(cli: Cli, proxy: PlayerProxy<'_>) -> StdResult<()> {
    match cli.command {
        Commands::Play => handle_play_command(&proxy).await,
        Commands::Pause => handle_pause_command(&proxy).await,
        Commands::Toggle => handle_toggle_command(&proxy).await,
        Commands::Seek(seek_cmd) => handle_seek_command(&seek_cmd, &proxy).await,
        Commands::Percent(percent_cmd) => handle_percent_command(&percent_cmd, &proxy).await,
        Commands::Repeat(repeat_cmd) => handle_repeat_command(&repeat_cmd, &proxy).await,
        Commands::Trigger(trigger_cmd) => handle_trigger_command(&trigger_cmd, &proxy).await,
        Commands::Status => handle_status_command(&proxy).await,
        Commands::Stop => handle_stop_command(&proxy).await,
        Commands::Start => start_treesong(&proxy).await,
        Commands::Episodes => display_episodes().await,
        Commands::Faq => display_faq().await,
        Commands::Design => display_design().await,
        Commands::Fields(fields_cmd) => display_fields(fields_cmd.table).await,
    }
}

async fn handle_play_command(proxy: &PlayerProxy<'_>) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        proxy.play().await?;
        println!("Playback resumed");
    } else {
        eprintln!("treesong is not running");
    }
    Ok(())
}

async fn handle_pause_command(proxy: &PlayerProxy<'_>) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        proxy.pause().await?;
        println!("Playback paused");
    } else {
        eprintln!("treesong is not running");
    }
    Ok(())
}

async fn handle_toggle_command(proxy: &PlayerProxy<'_>) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        proxy.toggle().await?;
        let (is_playing, ..) = proxy.status().await?;
        println!("Now {}", if is_playing { "playing" } else { "paused" });
    } else {
        eprintln!("treesong is not running");
    }
    Ok(())
}

async fn handle_seek_command(seek_cmd: &SeekCommand, proxy: &PlayerProxy<'_>) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        proxy.seek(seek_cmd.time).await?;
        println!("Seeked to {}", format_time(seek_cmd.time.max(0.0)));
    } else {
        eprintln!("treesong is not running");
    }
    Ok(())
}

async fn handle_percent_command(
    percent_cmd: &PercentCommand,
    proxy: &PlayerProxy<'_>,
) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        proxy.seek_percent(percent_cmd.percent).await?;
        println!("Seeked to {:.1}%", percent_cmd.percent.clamp(0.0, 100.0));
    } else {
        eprintln!("treesong is not running");
    }
    Ok(())
}

async fn handle_repeat_command(
    repeat_cmd: &RepeatCommand,
    proxy: &PlayerProxy<'_>,
) -> StdResult<()> {
    if !is_treesong_running(proxy).await? {
        eprintln!("treesong is not running");
    } else if repeat_cmd.on == repeat_cmd.off {
        eprintln!("Pass exactly one of --on or --off");
    } else {
        proxy.set_repeat(repeat_cmd.on).await?;
        println!("Repeat {}", if repeat_cmd.on { "on" } else { "off" });
    }
    Ok(())
}

async fn handle_trigger_command(
    trigger_cmd: &TriggerCommand,
    proxy: &PlayerProxy<'_>,
) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        proxy.trigger(&trigger_cmd.target).await?;
        println!("Trigger sent for '{}'", trigger_cmd.target);
    } else {
        eprintln!("treesong is not running");
    }
    Ok(())
}

async fn handle_status_command(proxy: &PlayerProxy<'_>) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        let (is_playing, is_repeat, position, duration, progress) = proxy.status().await?;
        println!(
            "{} | repeat {}",
            if is_playing { "playing" } else { "paused" },
            if is_repeat { "on" } else { "off" }
        );
        println!(
            "{} / {} ({progress:.1}%)",
            format_time(position),
            format_time(duration)
        );
    } else {
        eprintln!("treesong is not running");
    }
    Ok(())
}

async fn handle_stop_command(proxy: &PlayerProxy<'_>) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        proxy.stop().await?;
        println!("treesong stopped");
    } else {
        eprintln!("treesong is not running");
    }
    Ok(())
}

async fn is_treesong_running(proxy: &PlayerProxy<'_>) -> StdResult<bool> {
    match proxy.test_connection().await {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

async fn start_treesong(proxy: &PlayerProxy<'_>) -> StdResult<()> {
    if is_treesong_running(proxy).await? {
        println!("treesong is already running");
        return Ok(());
    }

    let current_exe_path = std::env::current_exe()?;
    let exe_dir = current_exe_path.parent().ok_or_else(|| {
        App::InvalidInput("Failed to get the directory of the executable".to_string())
    })?;
    let treesong_path = exe_dir.join("treesong");

    if !treesong_path.exists() {
        return Err(App::InvalidInput(
            "treesong executable not found in the same directory".to_string(),
        ));
    }

    let child = Command::new(treesong_path).spawn().map_err(App::Io)?;
    println!("treesong started, process id: {:?}", child.id());
    Ok(())
}

async fn load_config() -> StdResult<Config> {
    let home_dir = std::env::var("HOME")?;
    let config_path = format!("{home_dir}/.config/treesong/config.toml");
    if !Path::new(&config_path).exists() {
        return Err(App::InvalidInput(format!(
            "Config file not found: {config_path}"
        )));
    }
    let content = fs::read_to_string(&config_path).await.map_err(App::Io)?;
    Ok(toml::from_str(&content)?)
}

async fn display_episodes() -> StdResult<()> {
    let config = load_config().await?;
    let client = reqwest::Client::new();
    let rows: Vec<FaqRow> = fetch_rows(
        &client,
        &config.baserow.api_base,
        &config.baserow.token,
        config.baserow.content_table,
    )
    .await?;
    let rows = published_sorted(rows);

    let mut index = 1;
    for row in &rows {
        for (title, body, mp3) in row.episode_listing() {
            println!("{index}. {title}");
            if !body.is_empty() {
                println!("   {body}");
            }
            println!("   {}", config.media.audio_url(&mp3));
            index += 1;
        }
    }
    if index == 1 {
        println!("No episodes found");
    }
    Ok(())
}

async fn display_faq() -> StdResult<()> {
    let config = load_config().await?;
    let client = reqwest::Client::new();
    let rows: Vec<FaqRow> = fetch_rows(
        &client,
        &config.baserow.api_base,
        &config.baserow.token,
        config.baserow.content_table,
    )
    .await?;
    let rows = published_sorted(rows);

    if rows.is_empty() {
        println!("No FAQ entries found");
        return Ok(());
    }
    for row in &rows {
        if !row.question.is_empty() {
            println!("## {}", row.question);
        }
        for paragraph in row.text_block.split("\n\n") {
            if !paragraph.trim().is_empty() {
                println!("{}", text::render_plain(paragraph.trim()));
            }
        }
        if !row.caption_main.is_empty() {
            println!("[{}]", text::render_plain(&row.caption_main));
        }
        println!();
    }
    Ok(())
}

async fn display_design() -> StdResult<()> {
    let config = load_config().await?;
    let Some(design_table) = config.baserow.design_table else {
        eprintln!("No design_table configured");
        return Ok(());
    };
    let client = reqwest::Client::new();
    let rows: Vec<DesignRow> = fetch_rows(
        &client,
        &config.baserow.api_base,
        &config.baserow.token,
        design_table,
    )
    .await?;
    for (name, value) in css_variables(&rows) {
        println!("--{name}: {value};");
    }
    Ok(())
}

async fn display_fields(table_id: u64) -> StdResult<()> {
    let config = load_config().await?;
    let client = reqwest::Client::new();
    let fields = fetch_fields(
        &client,
        &config.baserow.api_base,
        &config.baserow.token,
        table_id,
    )
    .await?;
    for field in fields {
        println!("{} ({}, id {})", field.name, field.field_type, field.id);
    }
    Ok(())
}

/// Same m:ss clock the player UI shows.
fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::format_time;

    #[test]
    fn format_time_pads_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.7), "0:09");
        assert_eq!(format_time(125.0), "2:05");
        assert_eq!(format_time(-3.0), "0:00");
    }
}
