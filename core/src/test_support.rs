//! Scripted transport and body shapes shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{io, thread};

use serde::Deserialize;

use crate::call::{Call, Callback};
use crate::classify::Classifier;
use crate::config::ClassifierConfig;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuccessBody {
    pub success: String,
}

impl SuccessBody {
    pub fn new(success: &str) -> Self {
        Self {
            success: success.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

pub fn classifier(fallback: bool) -> Classifier<SuccessBody, ErrorBody> {
    Classifier::json(ClassifierConfig::default().with_fallback(fallback))
}

type Script = Arc<dyn Fn() -> Result<HttpResponse, TransportError> + Send + Sync>;

#[derive(Default)]
pub struct StubState {
    executions: AtomicUsize,
    canceled: AtomicBool,
    held: Mutex<Option<Box<dyn Callback>>>,
}

impl StubState {
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// The callback parked by a held call, if enqueue has run.
    pub fn take_held(&self) -> Option<Box<dyn Callback>> {
        self.held.lock().unwrap().take()
    }
}

enum Dispatch {
    /// Deliver on a freshly spawned worker thread.
    Thread,
    /// Park the callback until the test takes it.
    Hold,
}

pub struct StubCall {
    script: Script,
    state: Arc<StubState>,
    request: HttpRequest,
    timeout: Option<Duration>,
    dispatch: Dispatch,
}

impl StubCall {
    fn scripted(script: Script) -> Self {
        Self {
            script,
            state: Arc::default(),
            request: HttpRequest::get("http://stub/endpoint"),
            timeout: None,
            dispatch: Dispatch::Thread,
        }
    }

    pub fn responding(response: HttpResponse) -> Self {
        Self::scripted(Arc::new(move || Ok(response.clone())))
    }

    pub fn failing(failure: impl Fn() -> TransportError + Send + Sync + 'static) -> Self {
        Self::scripted(Arc::new(move || Err(failure())))
    }

    pub fn held(mut self) -> Self {
        self.dispatch = Dispatch::Hold;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn state(&self) -> Arc<StubState> {
        Arc::clone(&self.state)
    }
}

fn run(script: &Script, state: &StubState) -> Result<HttpResponse, TransportError> {
    state.executions.fetch_add(1, Ordering::SeqCst);
    if state.is_canceled() {
        return Err(TransportError::Io(io::Error::new(io::ErrorKind::Interrupted, "Canceled")));
    }
    script()
}

impl Call for StubCall {
    fn execute(&self) -> Result<HttpResponse, TransportError> {
        run(&self.script, &self.state)
    }

    fn enqueue(&self, callback: Box<dyn Callback>) {
        match self.dispatch {
            Dispatch::Thread => {
                let script = Arc::clone(&self.script);
                let state = Arc::clone(&self.state);
                thread::spawn(move || match run(&script, &state) {
                    Ok(response) => callback.on_response(response),
                    Err(error) => callback.on_failure(error),
                });
            }
            Dispatch::Hold => {
                self.state.executions.fetch_add(1, Ordering::SeqCst);
                *self.state.held.lock().unwrap() = Some(callback);
            }
        }
    }

    fn cancel(&self) {
        self.state.canceled.store(true, Ordering::SeqCst);
    }

    fn is_canceled(&self) -> bool {
        self.state.is_canceled()
    }

    fn is_executed(&self) -> bool {
        self.state.executions() > 0
    }

    fn request(&self) -> &HttpRequest {
        &self.request
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn clone_call(&self) -> Box<dyn Call> {
        Box::new(StubCall {
            script: Arc::clone(&self.script),
            state: Arc::default(),
            request: self.request.clone(),
            timeout: self.timeout,
            dispatch: match self.dispatch {
                Dispatch::Thread => Dispatch::Thread,
                Dispatch::Hold => Dispatch::Hold,
            },
        })
    }
}
