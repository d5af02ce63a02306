//! Scripted engine and callback recorder for tests.

use std::sync::{Arc, Mutex};

use crate::callbacks::SessionCallbacks;
use crate::engine::{EngineEvent, EngineFactory, EngineFailure, EventSink, RecognitionEngine};
use crate::error::SpeechError;
use crate::session::{RecognitionConfig, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    Start,
    Stop,
    Abort,
}

#[derive(Default)]
struct Inner {
    created: Vec<(SessionId, RecognitionConfig)>,
    calls: Vec<(SessionId, EngineCall)>,
    sinks: Vec<EventSink>,
    create_error: Option<EngineFailure>,
    start_error: Option<EngineFailure>,
    stop_error: Option<EngineFailure>,
}

/// Shared view of every fake engine created by one factory.
#[derive(Clone, Default)]
pub struct FakeEngineHandle(Arc<Mutex<Inner>>);

impl FakeEngineHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&self) -> Box<dyn EngineFactory> {
        Box::new(FakeFactory(self.clone()))
    }

    pub fn created(&self) -> Vec<(SessionId, RecognitionConfig)> {
        self.0.lock().unwrap().created.clone()
    }

    pub fn calls(&self) -> Vec<(SessionId, EngineCall)> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn count(&self, session: SessionId, call: EngineCall) -> usize {
        self.calls()
            .into_iter()
            .filter(|(s, c)| *s == session && *c == call)
            .count()
    }

    /// Emit an event as the engine of `session` would.
    pub fn emit(&self, session: SessionId, event: EngineEvent) -> bool {
        let sink = self
            .0
            .lock()
            .unwrap()
            .sinks
            .iter()
            .find(|s| s.session() == session)
            .cloned();
        sink.map(|s| s.emit(event)).unwrap_or(false)
    }

    pub fn fail_create(&self, failure: Option<EngineFailure>) {
        self.0.lock().unwrap().create_error = failure;
    }

    pub fn fail_start(&self, failure: Option<EngineFailure>) {
        self.0.lock().unwrap().start_error = failure;
    }

    pub fn fail_stop(&self, failure: Option<EngineFailure>) {
        self.0.lock().unwrap().stop_error = failure;
    }
}

struct FakeFactory(FakeEngineHandle);

impl EngineFactory for FakeFactory {
    fn create(
        &mut self,
        config: &RecognitionConfig,
        events: EventSink,
    ) -> Result<Box<dyn RecognitionEngine>, EngineFailure> {
        let mut inner = self.0 .0.lock().unwrap();
        if let Some(failure) = inner.create_error.clone() {
            return Err(failure);
        }
        let session = events.session();
        inner.created.push((session, config.clone()));
        inner.sinks.push(events);
        Ok(Box::new(FakeEngine {
            session,
            handle: self.0.clone(),
        }))
    }
}

struct FakeEngine {
    session: SessionId,
    handle: FakeEngineHandle,
}

impl FakeEngine {
    fn record(&self, call: EngineCall) -> Result<(), EngineFailure> {
        let mut inner = self.handle.0.lock().unwrap();
        inner.calls.push((self.session, call));
        let failure = match call {
            EngineCall::Start => inner.start_error.clone(),
            EngineCall::Stop => inner.stop_error.clone(),
            EngineCall::Abort => None,
        };
        match failure {
            Some(f) => Err(f),
            None => Ok(()),
        }
    }
}

impl RecognitionEngine for FakeEngine {
    fn start(&mut self) -> Result<(), EngineFailure> {
        self.record(EngineCall::Start)
    }

    fn stop(&mut self) -> Result<(), EngineFailure> {
        self.record(EngineCall::Stop)
    }

    fn abort(&mut self) -> Result<(), EngineFailure> {
        self.record(EngineCall::Abort)
    }
}

/// Collects everything the controller reports through its callbacks.
#[derive(Clone, Default)]
pub struct Recorder {
    results: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<SpeechError>>>,
    debug: Arc<Mutex<Vec<String>>>,
    ends: Arc<Mutex<usize>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callbacks(&self) -> SessionCallbacks {
        let results = Arc::clone(&self.results);
        let errors = Arc::clone(&self.errors);
        let debug = Arc::clone(&self.debug);
        let ends = Arc::clone(&self.ends);
        SessionCallbacks::new(move |text| results.lock().unwrap().push(text.to_string()))
            .on_error(move |err| errors.lock().unwrap().push(err.clone()))
            .on_debug(move |msg| debug.lock().unwrap().push(msg.to_string()))
            .on_end(move || *ends.lock().unwrap() += 1)
    }

    /// Callbacks with only `on_result`.
    pub fn result_only(&self) -> SessionCallbacks {
        let results = Arc::clone(&self.results);
        SessionCallbacks::new(move |text| results.lock().unwrap().push(text.to_string()))
    }

    pub fn results(&self) -> Vec<String> {
        self.results.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<SpeechError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn debug(&self) -> Vec<String> {
        self.debug.lock().unwrap().clone()
    }

    pub fn ends(&self) -> usize {
        *self.ends.lock().unwrap()
    }

    pub fn saw_debug(&self, needle: &str) -> bool {
        self.debug().iter().any(|m| m.contains(needle))
    }
}
