use crate::player::controller::{MediaResource, PlaybackController};

/// Click-like interaction reported by the external scene layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneEvent {
    pub target: String,
}

pub type PlayStateObserver = Box<dyn Fn(bool) + Send>;

/// Bridges interaction events from an external visual system (the 3D
/// scene) into the controller's toggle command. Only events on the
/// configured target object count; everything else passes through
/// untouched.
pub struct TriggerAdapter {
    target: String,
    play_state_observer: Option<PlayStateObserver>,
}

impl TriggerAdapter {
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            play_state_observer: None,
        }
    }

    #[must_use]
    pub fn with_play_state_observer(mut self, observer: PlayStateObserver) -> Self {
        self.play_state_observer = Some(observer);
        self
    }

    /// Returns whether the event matched the configured target. On a
    /// match the controller is toggled first and the observer then
    /// sees the post-toggle play state.
    pub fn handle<M: MediaResource>(
        &self,
        event: &SceneEvent,
        controller: &mut PlaybackController<M>,
    ) -> bool {
        if event.target != self.target {
            return false;
        }
        controller.toggle();
        if let Some(observer) = &self.play_state_observer {
            observer(controller.is_playing());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{SceneEvent, TriggerAdapter};
    use crate::player::controller::{MediaResource, PlaybackController};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockMedia {
        start_requests: Cell<usize>,
        stop_requests: Cell<usize>,
    }

    impl MediaResource for Rc<MockMedia> {
        fn request_start(&self) {
            self.start_requests.set(self.start_requests.get() + 1);
        }

        fn request_stop(&self) {
            self.stop_requests.set(self.stop_requests.get() + 1);
        }

        fn position(&self) -> f64 {
            0.0
        }

        fn set_position(&self, _secs: f64) {}

        fn duration(&self) -> Option<f64> {
            Some(200.0)
        }
    }

    fn scene_event(target: &str) -> SceneEvent {
        SceneEvent {
            target: target.to_string(),
        }
    }

    #[test]
    fn matching_target_toggles_exactly_once() {
        let media = Rc::new(MockMedia::default());
        let mut controller = PlaybackController::new(Rc::clone(&media), false);
        let observed = Arc::new(Mutex::new(Vec::new()));
        let adapter = TriggerAdapter::new("Cylinder").with_play_state_observer(Box::new({
            let observed = Arc::clone(&observed);
            move |playing| observed.lock().unwrap().push(playing)
        }));

        assert!(adapter.handle(&scene_event("Cylinder"), &mut controller));

        assert!(controller.is_playing());
        assert_eq!(media.start_requests.get(), 1);
        assert_eq!(*observed.lock().unwrap(), vec![true]);
    }

    #[test]
    fn other_targets_are_ignored() {
        let media = Rc::new(MockMedia::default());
        let mut controller = PlaybackController::new(Rc::clone(&media), false);
        let adapter = TriggerAdapter::new("Cylinder");

        assert!(!adapter.handle(&scene_event("Cube"), &mut controller));

        assert!(!controller.is_playing());
        assert_eq!(media.start_requests.get(), 0);
    }

    #[test]
    fn observer_sees_post_toggle_state() {
        let media = Rc::new(MockMedia::default());
        let mut controller = PlaybackController::new(Rc::clone(&media), false);
        let observed = Arc::new(Mutex::new(Vec::new()));
        let adapter = TriggerAdapter::new("PlayButton").with_play_state_observer(Box::new({
            let observed = Arc::clone(&observed);
            move |playing| observed.lock().unwrap().push(playing)
        }));

        adapter.handle(&scene_event("PlayButton"), &mut controller);
        adapter.handle(&scene_event("PlayButton"), &mut controller);

        assert_eq!(*observed.lock().unwrap(), vec![true, false]);
        assert_eq!(media.stop_requests.get(), 1);
    }
}
