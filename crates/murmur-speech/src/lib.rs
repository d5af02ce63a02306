//! Murmur Speech crate - speech recognition session controller and voice input control.
//!
//! The `SpeechSessionController` owns at most one active recognition session and
//! reacts to engine events through an explicit state machine:
//! Idle -> Starting -> Listening, with Erroring while a network retry is pending and
//! Stopping during teardown. The speech engine and the host environment are injected
//! through the `EngineFactory` and `CapabilityProvider` traits.

pub mod callbacks;
pub mod capability;
pub mod controller;
pub mod debug_log;
pub mod engine;
pub mod error;
pub mod retry;
pub mod service;
pub mod session;
pub mod state;
pub mod voice_control;

#[cfg(test)]
pub(crate) mod fake;

pub use callbacks::SessionCallbacks;
pub use capability::{
    CapabilityProvider, EntryPoints, FixedCapabilities, HostEnvironment, LocalHostPolicy,
};
pub use controller::SpeechSessionController;
pub use debug_log::{DebugEntry, DebugLog};
pub use engine::{
    EngineEvent, EngineFactory, EngineFailure, ErrorCode, EventSink, RecognitionEngine,
    RecognitionResult, SessionEvent,
};
pub use error::SpeechError;
pub use retry::{PendingRetry, RetryCounter, RetryPolicy};
pub use service::SpeechService;
pub use session::{RecognitionConfig, RecognitionSession, SessionId};
pub use state::SessionState;
pub use voice_control::{
    ControlState, ControlView, DeviceKind, InputDevice, InputMode, MicrophoneProbe, PointerInput,
    SpeechBackend, TranscriptFn, VoiceInputControl,
};
