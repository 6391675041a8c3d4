use log::debug;

/// Control surface of the underlying streaming resource. Start and
/// stop are requests only; the resource confirms through events later.
pub trait MediaResource {
    fn request_start(&self);
    fn request_stop(&self);
    /// Live playback position in seconds.
    fn position(&self) -> f64;
    fn set_position(&self, secs: f64);
    /// Total length in seconds, `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;
}

/// Lifecycle notifications delivered by the resource. The controller
/// reads positions and durations back from the resource itself, so the
/// variants carry no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    MetadataLoaded,
    TimeAdvanced,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Before metadata has loaded.
    Idle,
    Paused,
    Playing,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_repeat: bool,
    pub current_time: f64,
    pub duration: f64,
}

impl PlaybackState {
    /// Derived on demand, never stored.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.progress_fraction() * 100.0
    }
}

pub type ProgressNotifier = Box<dyn Fn(f64) + Send>;

/// Transport state for one streaming audio resource: play, pause,
/// toggle, seeking by time or percent, and repeat-at-end. State
/// updates are optimistic; resource events reconcile them afterwards.
///
/// All mutation happens on whatever single task owns the controller,
/// so there is no locking in here.
pub struct PlaybackController<M: MediaResource> {
    media: Option<M>,
    state: PlaybackState,
    transport: Transport,
    progress_notifier: Option<ProgressNotifier>,
}

impl<M: MediaResource> PlaybackController<M> {
    #[must_use]
    pub fn new(media: M, repeat: bool) -> Self {
        let mut controller = Self {
            media: Some(media),
            state: PlaybackState {
                is_playing: false,
                is_repeat: repeat,
                current_time: 0.0,
                duration: 0.0,
            },
            transport: Transport::Idle,
            progress_notifier: None,
        };
        // The resource may have finished loading before we attached;
        // read the duration eagerly rather than wait for an event that
        // already fired.
        if let Some(duration) = controller.media.as_ref().and_then(MediaResource::duration) {
            controller.state.duration = duration;
            controller.transport = Transport::Paused;
        }
        controller
    }

    /// Controller with no resource bound. Every command is a silent
    /// no-op until reconstruction with a real resource.
    #[must_use]
    pub fn detached(repeat: bool) -> Self {
        Self {
            media: None,
            state: PlaybackState {
                is_playing: false,
                is_repeat: repeat,
                current_time: 0.0,
                duration: 0.0,
            },
            transport: Transport::Idle,
            progress_notifier: None,
        }
    }

    pub fn set_progress_notifier(&mut self, notifier: ProgressNotifier) {
        self.progress_notifier = Some(notifier);
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub fn transport(&self) -> Transport {
        self.transport
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    #[must_use]
    pub fn media(&self) -> Option<&M> {
        self.media.as_ref()
    }

    pub fn play(&mut self) {
        let Some(media) = &self.media else { return };
        media.request_start();
        self.state.is_playing = true;
        self.transport = Transport::Playing;
    }

    pub fn pause(&mut self) {
        let Some(media) = &self.media else { return };
        media.request_stop();
        self.state.is_playing = false;
        if self.transport == Transport::Playing {
            self.transport = Transport::Paused;
        }
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seeks to `secs`, clamped into `[0, duration]`. With no metadata
    /// yet the duration counts as 0 and the seek collapses to the
    /// start. Play state is untouched.
    pub fn seek(&mut self, secs: f64) {
        let Some(media) = &self.media else { return };
        let clamped = secs.clamp(0.0, self.state.duration.max(0.0));
        media.set_position(clamped);
        self.state.current_time = clamped;
        self.notify_progress();
    }

    /// Seeks to `pct` percent of the track. No-op until the duration
    /// is known, which also keeps the division safe.
    pub fn seek_to_percent(&mut self, pct: f64) {
        if self.state.duration <= 0.0 {
            return;
        }
        let pct = pct.clamp(0.0, 100.0);
        self.seek(pct / 100.0 * self.state.duration);
    }

    /// Takes effect immediately, including for an end-of-stream event
    /// already in flight.
    pub fn set_repeat(&mut self, repeat: bool) {
        self.state.is_repeat = repeat;
    }

    pub fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded => {
                if let Some(duration) = self.media.as_ref().and_then(MediaResource::duration) {
                    debug!("Metadata loaded, duration {duration:.1}s");
                    self.state.duration = duration;
                    if self.transport == Transport::Idle {
                        self.transport = Transport::Paused;
                    }
                }
            }
            MediaEvent::TimeAdvanced => {
                if let Some(media) = &self.media {
                    self.state.current_time = media.position();
                    self.notify_progress();
                }
            }
            MediaEvent::Ended => {
                if self.state.is_repeat {
                    if let Some(media) = &self.media {
                        media.set_position(0.0);
                        media.request_start();
                    }
                    self.state.current_time = 0.0;
                    self.transport = Transport::Playing;
                    self.notify_progress();
                } else {
                    // Position stays where the last time advance left
                    // it, at the end of the track.
                    self.state.is_playing = false;
                    self.transport = Transport::Ended;
                }
            }
        }
    }

    fn notify_progress(&self) {
        if let Some(notifier) = &self.progress_notifier {
            notifier(self.state.progress_percent());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaEvent, MediaResource, PlaybackController, Transport};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockMedia {
        position: Cell<f64>,
        duration: Cell<Option<f64>>,
        start_requests: Cell<usize>,
        stop_requests: Cell<usize>,
        seek_requests: Cell<usize>,
    }

    impl MediaResource for Rc<MockMedia> {
        fn request_start(&self) {
            self.start_requests.set(self.start_requests.get() + 1);
        }

        fn request_stop(&self) {
            self.stop_requests.set(self.stop_requests.get() + 1);
        }

        fn position(&self) -> f64 {
            self.position.get()
        }

        fn set_position(&self, secs: f64) {
            self.seek_requests.set(self.seek_requests.get() + 1);
            self.position.set(secs);
        }

        fn duration(&self) -> Option<f64> {
            self.duration.get()
        }
    }

    fn bound(duration: Option<f64>) -> (PlaybackController<Rc<MockMedia>>, Rc<MockMedia>) {
        let media = Rc::new(MockMedia::default());
        media.duration.set(duration);
        let controller = PlaybackController::new(Rc::clone(&media), false);
        (controller, media)
    }

    #[test]
    fn duration_known_at_bind_is_read_eagerly() {
        let (controller, _media) = bound(Some(120.0));
        assert_eq!(controller.state().duration, 120.0);
        assert_eq!(controller.transport(), Transport::Paused);
    }

    #[test]
    fn metadata_event_moves_idle_to_paused() {
        let (mut controller, media) = bound(None);
        assert_eq!(controller.transport(), Transport::Idle);

        media.duration.set(Some(200.0));
        controller.handle_event(MediaEvent::MetadataLoaded);

        assert_eq!(controller.state().duration, 200.0);
        assert_eq!(controller.transport(), Transport::Paused);
    }

    #[test]
    fn seek_clamps_into_track_bounds() {
        let (mut controller, media) = bound(Some(200.0));

        controller.seek(-5.0);
        assert_eq!(controller.state().current_time, 0.0);
        assert_eq!(media.position.get(), 0.0);

        controller.seek(250.0);
        assert_eq!(controller.state().current_time, 200.0);
        assert_eq!(media.position.get(), 200.0);

        controller.seek(100.0);
        assert_eq!(controller.state().current_time, 100.0);
        assert_eq!(media.position.get(), 100.0);
    }

    #[test]
    fn seek_without_metadata_collapses_to_start() {
        let (mut controller, media) = bound(None);
        controller.seek(30.0);
        assert_eq!(controller.state().current_time, 0.0);
        assert_eq!(media.position.get(), 0.0);
    }

    #[test]
    fn seek_does_not_change_play_state() {
        let (mut controller, _media) = bound(Some(200.0));
        controller.play();
        controller.seek(50.0);
        assert!(controller.is_playing());
        assert_eq!(controller.transport(), Transport::Playing);
    }

    #[test]
    fn percent_seek_scales_against_duration() {
        let (mut controller, _media) = bound(Some(200.0));
        controller.seek_to_percent(50.0);
        assert_eq!(controller.state().current_time, 100.0);
        assert_eq!(controller.state().progress_fraction(), 0.5);
    }

    #[test]
    fn percent_seek_is_noop_without_duration() {
        let (mut controller, media) = bound(None);
        controller.seek_to_percent(50.0);
        assert_eq!(media.seek_requests.get(), 0);
        assert_eq!(controller.state().current_time, 0.0);
    }

    #[test]
    fn percent_seek_clamps_out_of_range_input() {
        let (mut controller, _media) = bound(Some(200.0));

        controller.seek_to_percent(150.0);
        assert_eq!(controller.state().current_time, 200.0);

        controller.seek_to_percent(-10.0);
        assert_eq!(controller.state().current_time, 0.0);
    }

    #[test]
    fn toggle_requests_playback_and_is_an_involution() {
        let (mut controller, media) = bound(Some(200.0));
        assert!(!controller.is_playing());

        controller.toggle();
        assert!(controller.is_playing());
        assert_eq!(media.start_requests.get(), 1);

        controller.toggle();
        assert!(!controller.is_playing());
        assert_eq!(media.stop_requests.get(), 1);
    }

    #[test]
    fn ended_without_repeat_stops_at_the_end() {
        let (mut controller, media) = bound(Some(200.0));
        controller.play();
        media.position.set(200.0);
        controller.handle_event(MediaEvent::TimeAdvanced);

        controller.handle_event(MediaEvent::Ended);

        assert!(!controller.is_playing());
        assert_eq!(controller.transport(), Transport::Ended);
        assert_eq!(controller.state().current_time, 200.0);
    }

    #[test]
    fn ended_with_repeat_restarts_from_zero() {
        let (mut controller, media) = bound(Some(200.0));
        controller.set_repeat(true);
        controller.play();
        media.position.set(200.0);
        controller.handle_event(MediaEvent::TimeAdvanced);

        controller.handle_event(MediaEvent::Ended);

        assert!(controller.is_playing());
        assert_eq!(controller.transport(), Transport::Playing);
        assert_eq!(controller.state().current_time, 0.0);
        assert_eq!(media.position.get(), 0.0);
        // One request from play(), one reissued by the repeat restart.
        assert_eq!(media.start_requests.get(), 2);
    }

    #[test]
    fn play_after_ended_resumes() {
        let (mut controller, _media) = bound(Some(200.0));
        controller.play();
        controller.handle_event(MediaEvent::Ended);
        assert_eq!(controller.transport(), Transport::Ended);

        controller.play();
        assert!(controller.is_playing());
        assert_eq!(controller.transport(), Transport::Playing);
    }

    #[test]
    fn progress_notifier_receives_percentages() {
        let (mut controller, media) = bound(Some(200.0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        controller.set_progress_notifier(Box::new({
            let seen = Arc::clone(&seen);
            move |pct| seen.lock().unwrap().push(pct)
        }));

        media.position.set(50.0);
        controller.handle_event(MediaEvent::TimeAdvanced);
        controller.seek(150.0);

        assert_eq!(*seen.lock().unwrap(), vec![25.0, 75.0]);
    }

    #[test]
    fn progress_fraction_is_zero_without_duration() {
        let (mut controller, media) = bound(None);
        media.position.set(12.0);
        controller.handle_event(MediaEvent::TimeAdvanced);
        assert_eq!(controller.state().progress_fraction(), 0.0);
    }

    #[test]
    fn detached_controller_ignores_every_command() {
        let mut controller = PlaybackController::<Rc<MockMedia>>::detached(false);
        controller.play();
        controller.toggle();
        controller.seek(10.0);
        controller.seek_to_percent(50.0);
        assert!(!controller.is_playing());
        assert_eq!(controller.state().current_time, 0.0);
        assert_eq!(controller.transport(), Transport::Idle);
    }
}
