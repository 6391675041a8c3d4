use crate::error::App;
use crate::player::controller::{MediaEvent, MediaResource};
use futures_util::stream::StreamExt;
use gstreamer::prelude::*;
use gstreamer::{MessageView, Pipeline};
use log::{error, info};
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio::time::{interval, Duration};

const POSITION_TICK: Duration = Duration::from_millis(500);

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

fn clock_to_secs(time: gstreamer::ClockTime) -> f64 {
    time.nseconds() as f64 / NANOS_PER_SEC
}

fn secs_to_clock(secs: f64) -> gstreamer::ClockTime {
    gstreamer::ClockTime::from_nseconds((secs.max(0.0) * NANOS_PER_SEC) as u64)
}

/// `MediaResource` over a GStreamer pipeline streaming one audio URL.
/// Start/stop map to pipeline state changes and the controller's
/// lifecycle events are produced from the pipeline bus plus a position
/// ticker.
pub struct GstMedia {
    pipeline: Pipeline,
}

impl GstMedia {
    pub fn new(url: &str) -> Result<Self, App> {
        gstreamer::init().map_err(|e| App::Init(e.to_string()))?;
        let pipeline = Pipeline::new();
        build_stream_chain(&pipeline, url)?;

        // Preroll without starting playback so metadata loads while
        // the transport stays paused.
        pipeline
            .set_state(gstreamer::State::Paused)
            .map_err(|_| App::State("Failed to set pipeline to Paused".to_string()))?;

        info!("GStreamer pipeline created for {url}");
        Ok(Self { pipeline })
    }

    /// Spawns the bus listener and the position ticker, both feeding
    /// `event_sender`. The returned handles must be aborted on
    /// teardown before the pipeline is released.
    pub fn spawn_listeners(
        &self,
        event_sender: mpsc::Sender<MediaEvent>,
    ) -> Result<Vec<JoinHandle<()>>, App> {
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| App::Pipeline("Failed to get GStreamer bus".to_string()))?;

        let bus_task = task::spawn({
            let event_sender = event_sender.clone();
            bus.stream().for_each(move |msg| {
                let event_sender = event_sender.clone();
                async move {
                    let event = match msg.view() {
                        MessageView::Eos(_) => {
                            info!("EOS message received");
                            Some(MediaEvent::Ended)
                        }
                        MessageView::AsyncDone(_) | MessageView::DurationChanged(_) => {
                            Some(MediaEvent::MetadataLoaded)
                        }
                        MessageView::Error(err) => {
                            // Stream failures stay with the resource
                            // layer; the controller just never sees
                            // metadata arrive.
                            error!("Error from GStreamer pipeline: {}", err);
                            None
                        }
                        _ => None,
                    };
                    if let Some(event) = event {
                        if event_sender.send(event).await.is_err() {
                            error!("Failed to deliver media event");
                        }
                    }
                }
            })
        });

        let tick_task = task::spawn({
            let pipeline = self.pipeline.clone();
            async move {
                let mut tick = interval(POSITION_TICK);
                loop {
                    tick.tick().await;
                    if pipeline
                        .query_position::<gstreamer::ClockTime>()
                        .is_some()
                        && event_sender.send(MediaEvent::TimeAdvanced).await.is_err()
                    {
                        break;
                    }
                }
            }
        });

        Ok(vec![bus_task, tick_task])
    }

    pub fn release(&self) {
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            error!("Failed to release pipeline: {}", e);
        }
    }
}

impl MediaResource for GstMedia {
    fn request_start(&self) {
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Playing) {
            error!("Failed to play: {}", e);
        }
    }

    fn request_stop(&self) {
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Paused) {
            error!("Failed to pause: {}", e);
        }
    }

    fn position(&self) -> f64 {
        self.pipeline
            .query_position::<gstreamer::ClockTime>()
            .map_or(0.0, clock_to_secs)
    }

    fn set_position(&self, secs: f64) {
        if let Err(e) = self.pipeline.seek_simple(
            gstreamer::SeekFlags::FLUSH | gstreamer::SeekFlags::KEY_UNIT,
            secs_to_clock(secs),
        ) {
            error!("Failed to seek: {}", e);
        }
    }

    fn duration(&self) -> Option<f64> {
        self.pipeline
            .query_duration::<gstreamer::ClockTime>()
            .map(clock_to_secs)
    }
}

fn build_stream_chain(pipeline: &Pipeline, url: &str) -> Result<(), App> {
    let source = gstreamer::ElementFactory::make("souphttpsrc")
        .build()
        .map_err(|_| App::Element("Failed to create souphttpsrc element".to_string()))?;
    source.set_property("location", url);

    let decodebin = gstreamer::ElementFactory::make("decodebin")
        .build()
        .map_err(|_| App::Element("Failed to create decodebin element".to_string()))?;

    pipeline
        .add_many([&source, &decodebin])
        .map_err(|_| App::Pipeline("Failed to add elements to pipeline".to_string()))?;
    source
        .link(&decodebin)
        .map_err(|_| App::Link("Failed to link source to decodebin".to_string()))?;

    let pipeline_weak = pipeline.downgrade();

    decodebin.connect_pad_added(move |_, src_pad| {
        if let Some(pipeline) = pipeline_weak.upgrade() {
            let audioconvert = gstreamer::ElementFactory::make("audioconvert")
                .build()
                .expect("Failed to create audioconvert element");
            let audioresample = gstreamer::ElementFactory::make("audioresample")
                .build()
                .expect("Failed to create audioresample element");
            let autoaudiosink = gstreamer::ElementFactory::make("autoaudiosink")
                .build()
                .expect("Failed to create autoaudiosink element");

            pipeline
                .add_many([&audioconvert, &audioresample, &autoaudiosink])
                .expect("Failed to add elements to pipeline");

            audioconvert
                .sync_state_with_parent()
                .expect("Failed to sync_state_with_parent for audioconvert");
            audioresample
                .sync_state_with_parent()
                .expect("Failed to sync_state_with_parent for audioresample");
            autoaudiosink
                .sync_state_with_parent()
                .expect("Failed to sync_state_with_parent for autoaudiosink");

            let audio_pad = audioconvert
                .static_pad("sink")
                .expect("Failed to get static pad");
            src_pad.link(&audio_pad).expect("Failed to link pads");

            audioconvert
                .link(&audioresample)
                .expect("Failed to link audioconvert to audioresample");
            audioresample
                .link(&autoaudiosink)
                .expect("Failed to link audioresample to autoaudiosink");

            info!("Pipeline elements linked successfully");
        } else {
            error!("Failed to upgrade pipeline reference");
        }
    });

    Ok(())
}
