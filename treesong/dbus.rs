use crate::error::App;
use crate::player::{Command, Status};
use log::info;
use tokio::sync::{mpsc, oneshot, watch};
use zbus::{fdo, interface, ConnectionBuilder};

#[derive(Clone)]
pub struct PlayerDBus {
    tx: mpsc::Sender<Command>,
    stop_signal: watch::Sender<()>,
}

impl PlayerDBus {
    async fn send(&self, command: Command) -> fdo::Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))
    }
}

#[interface(name = "org.treesong.Player")]
impl PlayerDBus {
    async fn test_connection(&self) -> fdo::Result<()> {
        Ok(())
    }

    async fn play(&self) -> fdo::Result<()> {
        self.send(Command::Play).await
    }

    async fn pause(&self) -> fdo::Result<()> {
        self.send(Command::Pause).await
    }

    async fn toggle(&self) -> fdo::Result<()> {
        self.send(Command::Toggle).await
    }

    async fn seek(&self, secs: f64) -> fdo::Result<()> {
        self.send(Command::Seek(secs)).await
    }

    async fn seek_percent(&self, pct: f64) -> fdo::Result<()> {
        self.send(Command::SeekPercent(pct)).await
    }

    async fn set_repeat(&self, repeat: bool) -> fdo::Result<()> {
        self.send(Command::SetRepeat(repeat)).await
    }

    /// Scene-layer interaction forwarded as-is; the player decides
    /// whether the target matches its configured trigger object.
    async fn trigger(&self, target: String) -> fdo::Result<()> {
        self.send(Command::Trigger(target)).await
    }

    async fn status(&self) -> fdo::Result<(bool, bool, f64, f64, f64)> {
        let (reply_sender, reply_receiver) = oneshot::channel();
        self.send(Command::Status(reply_sender)).await?;
        let status: Status = reply_receiver
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        Ok((
            status.is_playing,
            status.is_repeat,
            status.position,
            status.duration,
            status.progress,
        ))
    }

    async fn stop(&self) -> fdo::Result<()> {
        self.send(Command::Stop).await?;
        self.stop_signal
            .send(())
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        Ok(())
    }
}

pub async fn run_dbus_server(
    command_sender: mpsc::Sender<Command>,
    stop_signal: watch::Sender<()>,
) -> Result<(), App> {
    let player_dbus = PlayerDBus {
        tx: command_sender,
        stop_signal: stop_signal.clone(),
    };

    let _connection = ConnectionBuilder::session()?
        .name("org.treesong.Player")?
        .serve_at("/org/treesong/Player", player_dbus)?
        .build()
        .await?;

    let mut stop_receiver = stop_signal.subscribe();

    // Wait for the stop signal
    tokio::select! {
        _ = stop_receiver.changed() => {
            info!("Stop signal received, shutting down DBus server...");
        }
    }

    Ok(())
}
