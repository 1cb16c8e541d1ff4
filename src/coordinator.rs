//! Single integration point between the active input source and the application.
//!
//! The coordinator attaches one [`InputSource`] to a surface, bridges its nine
//! streams onto an [`EventSink`], derives shortcuts, records bridged events,
//! and replays logs by swapping in a [`SimulatedInputSource`] when needed.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use log::{debug, info, warn};
use serde_json::{Value, json};

use crate::bridge::{self, BridgeState};
use crate::config::{ConfigPatch, InputConfig};
use crate::input::error::InputError;
use crate::input::events::{MouseButton, TouchPoint, Vector2};
use crate::input::live::LiveInputSource;
use crate::input::simulated::SimulatedInputSource;
use crate::input::source::{InputSource, SourceKind};
use crate::recording::{NullStore, PlaybackStore, RecordedEvent, RecordingArtifact};
use crate::replay::replay_events;
use crate::sink::EventSink;
use crate::surface::{RenderScene, Surface};

/// Component name attached to error reports on the sink.
pub const COMPONENT_NAME: &str = "InputManager";

pub struct InputCoordinator {
    surface: Rc<dyn Surface>,
    sink: Rc<dyn EventSink>,
    store: Rc<dyn PlaybackStore>,
    source: RefCell<Rc<dyn InputSource>>,
    bridge: Rc<RefCell<BridgeState>>,
    config: RefCell<InputConfig>,
    initialized: Cell<bool>,
    disposed: Cell<bool>,
}

impl InputCoordinator {
    /// Coordinator over an explicit source. Nothing is attached until [`init`](Self::init).
    pub fn with_source(
        source: Rc<dyn InputSource>,
        surface: Rc<dyn Surface>,
        sink: Rc<dyn EventSink>,
        config: InputConfig,
    ) -> Self {
        let bridge = Rc::new(RefCell::new(BridgeState::new(config.enabled)));
        Self {
            surface,
            sink,
            store: Rc::new(NullStore),
            source: RefCell::new(source),
            bridge,
            config: RefCell::new(config),
            initialized: Cell::new(false),
            disposed: Cell::new(false),
        }
    }

    /// Coordinator driven by the hosting engine's streams.
    pub fn live(
        scene: Rc<dyn RenderScene>,
        surface: Rc<dyn Surface>,
        sink: Rc<dyn EventSink>,
        config: InputConfig,
    ) -> Self {
        Self::with_source(
            Rc::new(LiveInputSource::new(scene)),
            surface,
            sink,
            config,
        )
    }

    /// Coordinator driven by synthetic events.
    pub fn simulated(
        surface: Rc<dyn Surface>,
        sink: Rc<dyn EventSink>,
        config: InputConfig,
    ) -> Self {
        Self::with_source(
            Rc::new(SimulatedInputSource::new()),
            surface,
            sink,
            config,
        )
    }

    /// Replaces the playback/recording store (default: [`NullStore`]).
    pub fn with_store(mut self, store: Rc<dyn PlaybackStore>) -> Self {
        self.store = store;
        self
    }

    /// Attaches the source, installs the bridge, loads the configured playback
    /// log (best-effort), and announces `input-initialized`.
    ///
    /// A live source configured as disabled is not attached until
    /// [`set_enabled(true)`](Self::set_enabled).
    ///
    /// # Errors
    /// Attach failures are reported on the sink's error channel and returned as
    /// [`InputError::Initialization`]; the coordinator stays un-initialized.
    pub async fn init(&self) -> Result<(), InputError> {
        if self.disposed.get() {
            return Err(InputError::Disposed);
        }
        if self.initialized.get() {
            warn!("Input coordinator already initialized");
            return Ok(());
        }

        let source = self.source();
        let deferred = source.kind() == SourceKind::Live && !self.config.borrow().enabled;
        if deferred {
            debug!("Input disabled at init; live source attaches on enable");
        } else if let Err(err) = source.attach(Rc::clone(&self.surface)) {
            let wrapped = InputError::Initialization(err.to_string());
            self.sink.report_error(
                Some(&json!({ "component": COMPONENT_NAME })),
                &wrapped,
                "init",
                json!({ "source": source_kind_name(source.kind()) }),
            );
            return Err(wrapped);
        }
        bridge::install(&*source, &self.bridge, &self.sink);
        self.initialized.set(true);

        let playback_file = self.config.borrow().playback_file.clone();
        if let Some(resource) = playback_file {
            match self.store.load(&resource).await {
                Ok(events) => {
                    info!("Loaded {} playback events from {resource}", events.len());
                    self.bridge.borrow_mut().events = events;
                }
                Err(err) => warn!("Failed to load playback log {resource}: {err:#}"),
            }
        }

        info!(
            "Input coordinator initialized ({} source)",
            source_kind_name(source.kind())
        );
        self.sink.publish("input-initialized", json!({}));
        Ok(())
    }

    /// Gates bridged delivery. A live source is detached while disabled and
    /// re-attached on enable; a simulated source stays attached.
    pub fn set_enabled(&self, enabled: bool) {
        self.bridge.borrow_mut().enabled = enabled;
        self.config.borrow_mut().enabled = enabled;

        let source = self.source();
        if source.kind() == SourceKind::Live && self.initialized.get() && !self.disposed.get() {
            if enabled {
                if let Err(err) = source.attach(Rc::clone(&self.surface)) {
                    warn!("Failed to re-attach live input source: {err}");
                }
            } else {
                source.detach();
            }
        }

        debug!("Input enabled: {enabled}");
        self.sink
            .publish("input-enabled-changed", json!({ "enabled": enabled }));
    }

    pub fn is_enabled(&self) -> bool {
        self.bridge.borrow().enabled
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn pointer_position(&self) -> Vector2 {
        self.source().pointer_position()
    }

    pub fn is_pointer_down(&self, button: Option<MouseButton>) -> bool {
        self.source().is_pointer_down(button)
    }

    pub fn active_touches(&self) -> Vec<TouchPoint> {
        self.source().active_touches()
    }

    /// Clears the log and starts appending bridged events to it.
    pub fn start_recording(&self) {
        {
            let mut bridge = self.bridge.borrow_mut();
            bridge.recording = true;
            bridge.events.clear();
        }
        info!("Input recording started");
        self.sink.publish("input-recording-started", json!({}));
    }

    /// Stops appending and returns a copy of the log.
    pub fn stop_recording(&self) -> Vec<RecordedEvent> {
        let events = {
            let mut bridge = self.bridge.borrow_mut();
            bridge.recording = false;
            bridge.events.clone()
        };
        info!("Input recording stopped with {} events", events.len());
        self.sink.publish(
            "input-recording-stopped",
            json!({ "eventCount": events.len() }),
        );
        events
    }

    pub fn is_recording(&self) -> bool {
        self.bridge.borrow().recording
    }

    /// Copy of the recorded (or most recently loaded) log.
    pub fn recorded_events(&self) -> Vec<RecordedEvent> {
        self.bridge.borrow().events.clone()
    }

    /// Replays `log`, or the coordinator's own log when `None`, and resolves
    /// once every event has been dispatched. Returns the number dispatched.
    ///
    /// A live (or detached) source is disposed first and replaced by a fresh,
    /// attached simulated source with the bridge re-installed.
    ///
    /// # Errors
    /// [`InputError::NoPlaybackEvents`] for an empty log; any dispatch failure,
    /// such as [`InputError::NotAttached`] after [`dispose`](Self::dispose).
    pub async fn start_playback(
        &self,
        log: Option<Vec<RecordedEvent>>,
    ) -> Result<usize, InputError> {
        if self.disposed.get() {
            return Err(InputError::Disposed);
        }
        let events = log.unwrap_or_else(|| self.bridge.borrow().events.clone());
        if events.is_empty() {
            return Err(InputError::NoPlaybackEvents);
        }

        let source = self.playback_source()?;
        let Some(simulated) = source.as_simulated() else {
            return Err(InputError::NotAttached);
        };

        info!("Playback started with {} events", events.len());
        self.sink.publish(
            "input-playback-started",
            json!({ "eventCount": events.len() }),
        );

        let dispatched = match replay_events(simulated, &events).await {
            Ok(dispatched) => dispatched,
            Err(err) => {
                warn!("Playback aborted: {err}");
                return Err(err);
            }
        };

        info!("Playback completed ({dispatched} events dispatched)");
        self.sink.publish(
            "input-playback-completed",
            json!({ "eventCount": dispatched }),
        );
        Ok(dispatched)
    }

    /// Returns an attached simulated source, swapping one in if necessary.
    fn playback_source(&self) -> Result<Rc<dyn InputSource>, InputError> {
        let current = self.source();
        if current.as_simulated().is_some() && current.is_attached() {
            return Ok(current);
        }

        debug!(
            "Swapping {} source for a simulated one",
            source_kind_name(current.kind())
        );
        current.dispose();

        let fresh: Rc<dyn InputSource> = Rc::new(SimulatedInputSource::new());
        fresh.attach(Rc::clone(&self.surface))?;
        bridge::install(&*fresh, &self.bridge, &self.sink);
        *self.source.borrow_mut() = Rc::clone(&fresh);
        self.initialized.set(true);
        Ok(fresh)
    }

    /// Persists an active, non-empty recording through the store, clears the
    /// log, and disposes the source. Returns where the recording was written.
    ///
    /// Calling it more than once is a no-op.
    pub fn dispose(&self) -> Option<PathBuf> {
        if self.disposed.replace(true) {
            return None;
        }

        let events = {
            let mut bridge = self.bridge.borrow_mut();
            let events = std::mem::take(&mut bridge.events);
            let recording = std::mem::replace(&mut bridge.recording, false);
            if recording { events } else { Vec::new() }
        };

        let saved = if events.is_empty() {
            None
        } else {
            match self.store.save(&RecordingArtifact::new(events)) {
                Ok(Some(path)) => {
                    info!("Recording persisted to {}", path.display());
                    Some(path)
                }
                Ok(None) => None,
                Err(err) => {
                    warn!("Failed to persist recording: {err:#}");
                    None
                }
            }
        };

        self.source().dispose();
        self.initialized.set(false);
        debug!("Input coordinator disposed");
        saved
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Merges `patch` into the input configuration. Announces
    /// `input-config-updated` when touch or keyboard enablement is named.
    ///
    /// An `enabled` value goes through [`set_enabled`](Self::set_enabled), so the
    /// stored flag and delivery never disagree.
    pub fn update_config(&self, patch: ConfigPatch) {
        self.config.borrow_mut().apply(&patch);
        if let Some(enabled) = patch.enabled {
            self.set_enabled(enabled);
        }
        if patch.touches_device_flags() {
            let payload = serde_json::to_value(&patch).unwrap_or(Value::Null);
            self.sink.publish("input-config-updated", payload);
        }
    }

    pub fn config(&self) -> InputConfig {
        self.config.borrow().clone()
    }

    /// Asks the surface for pointer lock. Returns whether the lock was taken.
    pub fn request_pointer_lock(&self) -> bool {
        if !self.config.borrow().pointer_lock_enabled {
            debug!("Pointer lock disabled in config");
            return false;
        }
        match self.surface.request_pointer_lock() {
            Ok(()) => true,
            Err(err) => {
                warn!("Pointer lock unavailable: {err}");
                false
            }
        }
    }

    pub fn exit_pointer_lock(&self) {
        if self.config.borrow().pointer_lock_enabled {
            self.surface.exit_pointer_lock();
        }
    }

    pub fn source(&self) -> Rc<dyn InputSource> {
        Rc::clone(&self.source.borrow())
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.borrow().kind()
    }
}

fn source_kind_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Live => "live",
        SourceKind::Simulated => "simulated",
    }
}
