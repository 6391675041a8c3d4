pub mod controller;
pub mod gst_media;
pub mod trigger;

use crate::config::PlayerConfig;
use crate::error::App;
use controller::{MediaEvent, PlaybackController};
use gst_media::GstMedia;
use log::{debug, info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use trigger::{SceneEvent, TriggerAdapter};

pub enum Command {
    Play,
    Pause,
    Toggle,
    Seek(f64),
    SeekPercent(f64),
    SetRepeat(bool),
    Trigger(String),
    Status(oneshot::Sender<Status>),
    Stop,
}

#[derive(Debug, Clone, Copy)]
pub struct Status {
    pub is_playing: bool,
    pub is_repeat: bool,
    pub position: f64,
    pub duration: f64,
    pub progress: f64,
}

/// Owns the controller and serializes every mutation — commands from
/// the control surface and lifecycle events from the pipeline — on one
/// select loop, so playback state needs no locking.
pub struct Player {
    controller: PlaybackController<GstMedia>,
    trigger: TriggerAdapter,
    command_receiver: mpsc::Receiver<Command>,
    event_receiver: mpsc::Receiver<MediaEvent>,
    listener_tasks: Vec<JoinHandle<()>>,
}

impl Player {
    pub fn new(
        audio_url: &str,
        config: &PlayerConfig,
        command_receiver: mpsc::Receiver<Command>,
    ) -> Result<Self, App> {
        let media = GstMedia::new(audio_url)?;
        let (event_sender, event_receiver) = mpsc::channel(16);
        let listener_tasks = media.spawn_listeners(event_sender)?;

        let mut controller = PlaybackController::new(media, config.repeat);
        controller.set_progress_notifier(Box::new(|pct| debug!("Progress {pct:.1}%")));

        let trigger = TriggerAdapter::new(config.trigger_object.clone())
            .with_play_state_observer(Box::new(|playing| {
                info!("Play state changed: {playing}");
            }));

        Ok(Self {
            controller,
            trigger,
            command_receiver,
            event_receiver,
            listener_tasks,
        })
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(command) = self.command_receiver.recv() => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Some(event) = self.event_receiver.recv() => {
                    self.controller.handle_event(event);
                }
                else => break,
            }
        }
        self.shutdown();
    }

    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Play => {
                info!("Resume playback");
                self.controller.play();
            }
            Command::Pause => {
                info!("Pause");
                self.controller.pause();
            }
            Command::Toggle => {
                self.controller.toggle();
                info!("Toggled, playing: {}", self.controller.is_playing());
            }
            Command::Seek(secs) => {
                self.controller.seek(secs);
            }
            Command::SeekPercent(pct) => {
                self.controller.seek_to_percent(pct);
            }
            Command::SetRepeat(repeat) => {
                info!("Repeat set to {repeat}");
                self.controller.set_repeat(repeat);
            }
            Command::Trigger(target) => {
                let event = SceneEvent { target };
                if !self.trigger.handle(&event, &mut self.controller) {
                    debug!("Ignoring trigger for '{}'", event.target);
                }
            }
            Command::Status(reply) => {
                let state = self.controller.state();
                let _ = reply.send(Status {
                    is_playing: state.is_playing,
                    is_repeat: state.is_repeat,
                    position: state.current_time,
                    duration: state.duration,
                    progress: state.progress_percent(),
                });
            }
            Command::Stop => {
                info!("Stopping player");
                return false;
            }
        }
        true
    }

    /// Listener tasks are aborted before the pipeline is released.
    fn shutdown(&mut self) {
        for task in self.listener_tasks.drain(..) {
            task.abort();
        }
        if let Some(media) = self.controller.media() {
            media.release();
        }
    }
}
