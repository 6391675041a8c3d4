mod baserow;
mod config;
mod dbus;
mod error;
mod media;
mod player;

use crate::baserow::fetch_rows::{all_episodes, select_episode, Baserow};
use crate::error::App;
use crate::player::{Command, Player};
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming};
use log::info;
use std::process;
use tokio::{
    fs,
    sync::{mpsc, watch},
    task,
};

#[tokio::main]
async fn main() -> Result<(), App> {
    let home_dir = std::env::var("HOME").map_err(|e| {
        App::Io(
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Failed to get HOME environment variable: {e}"),
            )
            .to_string(),
        )
    })?;

    // Define the required directories
    let log_dir = format!("{home_dir}/.config/treesong/logs");
    fs::create_dir_all(&log_dir).await?;

    // Logger setup
    Logger::try_with_str("info")?
        .log_to_file(FileSpec::default().directory(&log_dir))
        .rotate(
            Criterion::Size(1_000_000),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(3),
        )
        .duplicate_to_stderr(Duplicate::None)
        .start()?;

    let config_path = format!("{home_dir}/.config/treesong/config.toml");
    let config = config::load(&config_path).await?;

    let client = reqwest::Client::new();
    let cms = Baserow::new(client.clone(), &config.baserow);
    let rows = cms.content_rows(config.baserow.content_table).await?;
    let episodes = all_episodes(&rows);
    let episode = select_episode(&episodes, config.player.episode.as_deref())
        .ok_or_else(|| App::Config("No playable episode found in the content table".to_string()))?;
    info!("Selected episode: {}", episode.title);

    // Rows usually carry bare file names; tolerate full URLs too.
    let audio_url = if episode.mp3.starts_with("http") {
        episode.mp3.clone()
    } else {
        config.media.audio_url(&episode.mp3)
    };
    media::ensure_stream_available(&client, &audio_url).await?;

    let (command_sender, command_receiver) = mpsc::channel(8);
    let (stop_sender, stop_receiver) = watch::channel(());

    let player = Player::new(&audio_url, &config.player, command_receiver)?;

    task::spawn({
        let command_sender = command_sender.clone();
        let stop_sender = stop_sender.clone();
        async move {
            let _ = dbus::run_dbus_server(command_sender, stop_sender).await;
        }
    });

    let player_task = task::spawn(player.run());

    wait_for_stop_signal(stop_receiver, &command_sender).await?;
    player_task.await?;
    process::exit(0);
}

async fn wait_for_stop_signal(
    mut stop_receiver: watch::Receiver<()>,
    command_sender: &mpsc::Sender<Command>,
) -> Result<(), App> {
    tokio::select! {
        _ = stop_receiver.changed() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
            command_sender.send(Command::Stop).await?;
        }
    }
    Ok(())
}
