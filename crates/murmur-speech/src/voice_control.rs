//! Voice input control.
//!
//! Translates pointer and touch gestures into start/stop calls on a speech
//! backend and exposes what the control should render. The control is
//! disabled until mounted, and stays disabled when the host cannot recognize
//! speech or no audio input device is enumerable.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use murmur_core::MurmurError;

use crate::callbacks::SessionCallbacks;
use crate::controller::SpeechSessionController;
use crate::debug_log::DebugLog;
use crate::service::SpeechService;

/// What the control drives. Implemented by the bare controller and by the
/// async service.
pub trait SpeechBackend {
    fn supports_recognition(&self) -> bool;
    fn start(&mut self, callbacks: SessionCallbacks) -> bool;
    fn stop(&mut self, on_debug: &mut dyn FnMut(&str));
}

impl SpeechBackend for SpeechSessionController {
    fn supports_recognition(&self) -> bool {
        SpeechSessionController::supports_recognition(self)
    }

    fn start(&mut self, callbacks: SessionCallbacks) -> bool {
        SpeechSessionController::start(self, callbacks)
    }

    fn stop(&mut self, on_debug: &mut dyn FnMut(&str)) {
        SpeechSessionController::stop(self, Some(on_debug));
    }
}

impl SpeechBackend for SpeechService {
    fn supports_recognition(&self) -> bool {
        SpeechService::supports_recognition(self)
    }

    fn start(&mut self, callbacks: SessionCallbacks) -> bool {
        SpeechService::start(self, callbacks)
    }

    fn stop(&mut self, on_debug: &mut dyn FnMut(&str)) {
        self.stop_with_debug(on_debug);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Record while the pointer or finger is held down.
    #[default]
    PressAndHold,
    /// Click once to start, again to stop.
    Toggle,
}

/// Gestures delivered to the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerInput {
    MouseDown,
    MouseUp,
    MouseLeave,
    TouchStart,
    TouchEnd,
    TouchCancel,
    Click,
}

impl PointerInput {
    fn is_press(self) -> bool {
        matches!(self, PointerInput::MouseDown | PointerInput::TouchStart)
    }

    fn is_release(self) -> bool {
        matches!(
            self,
            PointerInput::MouseUp
                | PointerInput::MouseLeave
                | PointerInput::TouchEnd
                | PointerInput::TouchCancel
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Disabled,
    Idle,
    Recording,
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlState::Disabled => write!(f, "disabled"),
            ControlState::Idle => write!(f, "idle"),
            ControlState::Recording => write!(f, "recording"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    AudioInput,
    AudioOutput,
    VideoInput,
}

/// A media device reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub kind: DeviceKind,
    pub label: String,
}

impl InputDevice {
    pub fn microphone(label: impl Into<String>) -> Self {
        Self {
            kind: DeviceKind::AudioInput,
            label: label.into(),
        }
    }
}

/// Enumerates the host's media devices.
pub trait MicrophoneProbe {
    fn enumerate_devices(&self) -> Result<Vec<InputDevice>, MurmurError>;
}

/// Everything the host needs to draw the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub state: ControlState,
    pub label: &'static str,
    pub title: &'static str,
    pub error: Option<String>,
    pub debug_lines: Vec<String>,
}

pub type TranscriptFn = Arc<dyn Fn(&str) + Send + Sync>;

/// State shared with the callbacks handed to the backend.
#[derive(Debug, Default)]
struct Status {
    recording: bool,
    error: Option<String>,
    debug: DebugLog,
}

fn lock(status: &Mutex<Status>) -> MutexGuard<'_, Status> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct VoiceInputControl<B> {
    backend: B,
    mode: InputMode,
    on_transcript: TranscriptFn,
    status: Arc<Mutex<Status>>,
    microphone: Option<bool>,
}

impl<B: SpeechBackend> VoiceInputControl<B> {
    pub fn new(backend: B, mode: InputMode, on_transcript: TranscriptFn) -> Self {
        Self {
            backend,
            mode,
            on_transcript,
            status: Arc::new(Mutex::new(Status::default())),
            microphone: None,
        }
    }

    /// Keep at most `capacity` debug lines.
    pub fn with_debug_capacity(self, capacity: usize) -> Self {
        lock(&self.status).debug = DebugLog::with_capacity(capacity);
        self
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_mounted(&self) -> bool {
        self.microphone.is_some()
    }

    /// Probe for a microphone. Only the first call after construction or
    /// `unmount` enumerates devices.
    pub fn mount(&mut self, probe: &dyn MicrophoneProbe) {
        if self.microphone.is_some() {
            return;
        }
        let available = match probe.enumerate_devices() {
            Ok(devices) => devices.iter().any(|d| d.kind == DeviceKind::AudioInput),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to enumerate media devices");
                false
            }
        };
        tracing::debug!(microphone = available, "Voice input mounted");
        self.microphone = Some(available);
    }

    /// Stop any recording and forget the probe result.
    pub fn unmount(&mut self) {
        if self.is_recording() {
            self.end();
        }
        self.microphone = None;
    }

    /// Drop the last error shown by the control.
    pub fn clear_error(&mut self) {
        lock(&self.status).error = None;
    }

    pub fn is_recording(&self) -> bool {
        lock(&self.status).recording
    }

    pub fn state(&self) -> ControlState {
        if !self.is_enabled() {
            ControlState::Disabled
        } else if self.is_recording() {
            ControlState::Recording
        } else {
            ControlState::Idle
        }
    }

    fn is_enabled(&self) -> bool {
        self.microphone == Some(true) && self.backend.supports_recognition()
    }

    /// Feed one gesture. Returns whether it started or stopped a recording.
    pub fn handle_input(&mut self, input: PointerInput) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let recording = self.is_recording();

        match self.mode {
            InputMode::PressAndHold if input.is_press() && !recording => self.begin(),
            InputMode::PressAndHold if input.is_release() && recording => {
                self.end();
                true
            }
            InputMode::Toggle if input == PointerInput::Click => {
                if recording {
                    self.end();
                    true
                } else {
                    self.begin()
                }
            }
            _ => false,
        }
    }

    pub fn view(&self) -> ControlView {
        let state = self.state();
        let (label, title) = match (state, self.mode) {
            (ControlState::Disabled, _) => ("Voice input unavailable", self.disabled_reason()),
            (ControlState::Idle, InputMode::PressAndHold) => {
                ("Hold to record", "Press and hold to dictate")
            }
            (ControlState::Idle, InputMode::Toggle) => ("Start recording", "Start recording"),
            (ControlState::Recording, InputMode::PressAndHold) => {
                ("Recording...", "Release to stop recording")
            }
            (ControlState::Recording, InputMode::Toggle) => ("Stop recording", "Stop recording"),
        };

        let status = lock(&self.status);
        ControlView {
            state,
            label,
            title,
            error: status.error.clone(),
            debug_lines: status.debug.lines(),
        }
    }

    fn disabled_reason(&self) -> &'static str {
        match self.microphone {
            None => "Checking microphone...",
            Some(_) if !self.backend.supports_recognition() => {
                "Speech recognition is not supported in this browser"
            }
            _ => "No microphone found",
        }
    }

    fn begin(&mut self) -> bool {
        {
            let mut status = lock(&self.status);
            status.recording = true;
            status.error = None;
        }

        let started = self.backend.start(self.callbacks());
        if !started {
            lock(&self.status).recording = false;
        }
        started
    }

    fn end(&mut self) {
        let status = Arc::clone(&self.status);
        self.backend
            .stop(&mut |message: &str| lock(&status).debug.push(message));
        lock(&self.status).recording = false;
    }

    fn callbacks(&self) -> SessionCallbacks {
        let on_transcript = Arc::clone(&self.on_transcript);
        let on_error = Arc::clone(&self.status);
        let on_debug = Arc::clone(&self.status);
        let on_end = Arc::clone(&self.status);

        SessionCallbacks::new(move |text| on_transcript(text))
            .on_error(move |err| {
                let mut status = lock(&on_error);
                status.recording = false;
                status.error = Some(err.to_string());
                status.debug.push(format!("Error: {}", err));
            })
            .on_debug(move |message| lock(&on_debug).debug.push(message))
            .on_end(move || lock(&on_end).recording = false)
    }
}

impl<B> fmt::Debug for VoiceInputControl<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceInputControl")
            .field("mode", &self.mode)
            .field("microphone", &self.microphone)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
