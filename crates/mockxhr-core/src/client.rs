//! Patched client instance and request driver
//!
//! [`XhrClient`] reproduces the legacy client's observable behavior: the
//! ready-state lifecycle, the fixed event firing order, header formatting,
//! the request-body elision policy, and response-type coercion. Whether a
//! send cycle is served by the real network backend or by the mock
//! interception channel is decided once per `send()` and is not observable
//! through any property, event sequence, or header formatting.
//!
//! `send()` never blocks: it validates its preconditions synchronously and
//! hands the cycle to a driver task; every subsequent effect is delivered
//! through the event sequence and polled property reads.

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::body::transmitted_body;
use crate::channel::{Backend, Interceptor, PassthroughInterceptor};
use crate::coerce::{self, ResponseBody, ResponseKind};
use crate::config::ClientConfig;
use crate::errors::{Result, StateError, TransportError, XhrError};
use crate::events::{self, EventBridge, EventCallback, EventType, XhrEvent};
use crate::headers::HeaderMap;
use crate::state::ReadyState;
use crate::types::{CredentialsMode, Method, RequestDescriptor, ResponseDescriptor};

// ----------------------------------------------------------------------------
// Instance State
// ----------------------------------------------------------------------------

struct Inner {
    ready_state: ReadyState,
    /// Send-cycle counter; stale driver tasks compare against it and stop
    cycle: u64,
    sent: bool,
    method: Option<Method>,
    url: String,
    async_flag: bool,
    with_credentials: bool,
    timeout: Option<Duration>,
    response_kind: ResponseKind,
    mime_override: Option<String>,
    request_headers: HeaderMap,
    response_headers: HeaderMap,
    /// Immutable once assigned for the cycle
    raw_response: Option<Vec<u8>>,
    /// Lazily computed from `raw_response`, fixed after completion
    parsed: Option<ResponseBody>,
    status: u16,
    status_text: String,
    response_url: String,
    bridge: EventBridge,
    abort_handle: Option<AbortHandle>,
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

// ----------------------------------------------------------------------------
// Client
// ----------------------------------------------------------------------------

/// A patched (or native-wired) client instance
pub struct XhrClient {
    inner: Arc<Mutex<Inner>>,
    backend: Arc<dyn Backend>,
    interceptor: Arc<dyn Interceptor>,
    config: ClientConfig,
    state_tx: Arc<watch::Sender<ReadyState>>,
}

impl XhrClient {
    /// Create an instance routed through the given interception channel
    pub fn new(
        backend: Arc<dyn Backend>,
        interceptor: Arc<dyn Interceptor>,
        config: ClientConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(ReadyState::Unsent);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                ready_state: ReadyState::Unsent,
                cycle: 0,
                sent: false,
                method: None,
                url: String::new(),
                async_flag: true,
                with_credentials: false,
                timeout: config.timeout,
                response_kind: ResponseKind::Default,
                mime_override: None,
                request_headers: HeaderMap::new(),
                response_headers: HeaderMap::new(),
                raw_response: None,
                parsed: None,
                status: 0,
                status_text: String::new(),
                response_url: String::new(),
                bridge: EventBridge::new(),
                abort_handle: None,
            })),
            backend,
            interceptor,
            config,
            state_tx: Arc::new(state_tx),
        }
    }

    /// Create an instance wired straight to the network backend
    pub fn native(backend: Arc<dyn Backend>, config: ClientConfig) -> Self {
        Self::new(backend, Arc::new(PassthroughInterceptor), config)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    // ------------------------------------------------------------------------
    // Lifecycle operations
    // ------------------------------------------------------------------------

    /// Configure a request cycle. Resets the instance to OPENED, discarding
    /// any in-flight work from a previous cycle; listeners stay registered.
    pub fn open(&self, method: &str, url: &str, async_flag: bool) -> Result<()> {
        if method.trim().is_empty() {
            return Err(XhrError::config_error("request method must not be empty"));
        }
        if url.is_empty() {
            return Err(XhrError::config_error("request url must not be empty"));
        }

        let snapshot = {
            let mut inner = self.lock();
            if let Some(handle) = inner.abort_handle.take() {
                handle.abort();
            }
            inner.cycle += 1;
            inner.sent = false;
            inner.method = Some(Method::new(method));
            inner.url = url.to_owned();
            inner.async_flag = async_flag;
            inner.request_headers = HeaderMap::new();
            inner.response_headers = HeaderMap::new();
            inner.raw_response = None;
            inner.parsed = None;
            inner.status = 0;
            inner.status_text.clear();
            inner.response_url.clear();
            inner.mime_override = None;
            inner.ready_state = inner.ready_state.transition(ReadyState::Opened)?;
            inner.bridge.snapshot(EventType::ReadyStateChange)
        };

        self.state_tx.send_replace(ReadyState::Opened);
        events::dispatch(&snapshot, EventType::ReadyStateChange);
        Ok(())
    }

    /// Transmit the request. Validates the state precondition synchronously,
    /// applies the body elision policy, decides real-vs-mock routing once,
    /// and returns immediately; all outcomes arrive through events.
    pub fn send(&self, body: Option<Vec<u8>>) -> Result<()> {
        let (cycle, request, timeout) = {
            let mut inner = self.lock();
            if inner.ready_state != ReadyState::Opened || inner.sent {
                return Err(XhrError::send_not_opened(inner.ready_state));
            }
            let method = match inner.method.clone() {
                Some(method) => method,
                None => return Err(XhrError::send_not_opened(inner.ready_state)),
            };
            inner.sent = true;

            let body = transmitted_body(&method, body);
            let request = RequestDescriptor {
                method,
                url: inner.url.clone(),
                headers: inner.request_headers.clone(),
                body,
                credentials: CredentialsMode::from(inner.with_credentials),
            };
            (inner.cycle, request, inner.timeout)
        };

        // Routing decision: once per send, with no locks held
        let mock = self.interceptor.intercept(&request);
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            route = if mock.is_some() { "mock" } else { "network" },
            "dispatching request"
        );

        let driver = Driver {
            inner: Arc::clone(&self.inner),
            backend: Arc::clone(&self.backend),
            state_tx: Arc::clone(&self.state_tx),
            progress_chunk: self.config.progress_chunk,
        };
        let handle = tokio::spawn(async move { driver.run(cycle, request, mock, timeout).await });
        self.lock().abort_handle = Some(handle.abort_handle());
        Ok(())
    }

    /// Cancel the in-flight cycle: short-circuit to DONE, discard pending
    /// work, suppress `load`, fire `abort` then `loadend`. A no-op when
    /// nothing is in flight.
    pub fn abort(&self) {
        let snapshots = {
            let mut inner = self.lock();
            if let Some(handle) = inner.abort_handle.take() {
                handle.abort();
            }
            if !inner.sent || inner.ready_state.is_terminal() {
                return;
            }
            inner.cycle += 1;
            inner.sent = false;
            inner.ready_state = ReadyState::Done;
            (
                inner.bridge.snapshot(EventType::ReadyStateChange),
                inner.bridge.snapshot(EventType::Abort),
                inner.bridge.snapshot(EventType::LoadEnd),
            )
        };

        self.state_tx.send_replace(ReadyState::Done);
        events::dispatch(&snapshots.0, EventType::ReadyStateChange);
        events::dispatch(&snapshots.1, EventType::Abort);
        events::dispatch(&snapshots.2, EventType::LoadEnd);
    }

    /// Await the terminal state of the current cycle. Convenience for
    /// callers and tests; not part of the mirrored surface.
    pub async fn wait_done(&self) {
        let mut rx = self.state_tx.subscribe();
        let _ = rx.wait_for(|state| state.is_terminal()).await;
    }

    // ------------------------------------------------------------------------
    // Request configuration
    // ------------------------------------------------------------------------

    /// Append a request header; valid only between `open()` and `send()`
    pub fn set_request_header(&self, name: &str, value: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(XhrError::config_error("header name must not be empty"));
        }
        let mut inner = self.lock();
        if inner.ready_state != ReadyState::Opened || inner.sent {
            return Err(StateError::HeaderNotOpened {
                state: inner.ready_state,
            }
            .into());
        }
        inner.request_headers.append(name, value);
        Ok(())
    }

    /// Async flag recorded by the last `open()`
    pub fn is_async(&self) -> bool {
        self.lock().async_flag
    }

    pub fn with_credentials(&self) -> bool {
        self.lock().with_credentials
    }

    pub fn set_with_credentials(&self, enabled: bool) {
        self.lock().with_credentials = enabled;
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.lock().timeout
    }

    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.lock().timeout = timeout;
    }

    pub fn response_kind(&self) -> ResponseKind {
        self.lock().response_kind
    }

    /// Select the response representation; rejected once the cycle is DONE
    /// because the coerced response is fixed after completion.
    pub fn set_response_kind(&self, kind: ResponseKind) -> Result<()> {
        let mut inner = self.lock();
        if inner.ready_state.is_terminal() {
            return Err(StateError::AlreadyCompleted {
                state: inner.ready_state,
            }
            .into());
        }
        inner.response_kind = kind;
        Ok(())
    }

    /// Best-effort mime override, applied to the response Content-Type
    /// before coercion when the serving branch supports it.
    pub fn override_mime_type(&self, mime: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.ready_state >= ReadyState::Loading {
            return Err(StateError::AlreadyCompleted {
                state: inner.ready_state,
            }
            .into());
        }
        inner.mime_override = Some(mime.to_owned());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Response accessors
    // ------------------------------------------------------------------------

    pub fn ready_state(&self) -> ReadyState {
        self.lock().ready_state
    }

    pub fn status(&self) -> u16 {
        self.lock().status
    }

    pub fn status_text(&self) -> String {
        self.lock().status_text.clone()
    }

    pub fn response_url(&self) -> String {
        self.lock().response_url.clone()
    }

    /// Raw response bytes, available once the cycle completes
    pub fn raw_response(&self) -> Option<Vec<u8>> {
        self.lock().raw_response.clone()
    }

    /// The response coerced to the selected kind. Computed lazily on first
    /// access after completion and cached; coercion failure is `Null`,
    /// never an error.
    pub fn response(&self) -> ResponseBody {
        let mut inner = self.lock();
        if !inner.ready_state.is_terminal() {
            // Before completion the textual kinds read as empty text,
            // everything else as null, matching the native surface.
            return if inner.response_kind.is_textual() {
                ResponseBody::Text(String::new())
            } else {
                ResponseBody::Null
            };
        }
        if let Some(parsed) = &inner.parsed {
            return parsed.clone();
        }
        let raw = inner.raw_response.clone().unwrap_or_default();
        let content_type = inner.response_headers.get("content-type").map(str::to_owned);
        let parsed = coerce::coerce(&raw, inner.response_kind, content_type.as_deref());
        inner.parsed = Some(parsed.clone());
        parsed
    }

    /// Text view of the response, defined for the default and text kinds
    pub fn response_text(&self) -> Option<String> {
        let inner = self.lock();
        if !inner.response_kind.is_textual() {
            return None;
        }
        Some(
            inner
                .raw_response
                .as_deref()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default(),
        )
    }

    /// Response header lookup; mock-injected values are returned when the
    /// mock pipeline served this cycle, native values otherwise.
    pub fn get_response_header(&self, name: &str) -> Option<String> {
        self.lock().response_headers.get(name).map(str::to_owned)
    }

    /// Combined response-header block, CR LF terminated lines
    pub fn get_all_response_headers(&self) -> String {
        self.lock().response_headers.to_wire_string()
    }

    // ------------------------------------------------------------------------
    // Event registration
    // ------------------------------------------------------------------------

    /// Register a listener; listeners persist across `open()` cycles
    pub fn add_event_listener(&self, kind: EventType, callback: EventCallback) {
        self.lock().bridge.add_listener(kind, callback);
    }

    /// Set or clear the single-slot `on<type>` handler
    pub fn set_event_handler(&self, kind: EventType, callback: Option<EventCallback>) {
        self.lock().bridge.set_handler(kind, callback);
    }

    /// Closure-friendly listener registration
    pub fn listen<F>(&self, kind: EventType, callback: F)
    where
        F: Fn(&XhrEvent) + Send + Sync + 'static,
    {
        self.add_event_listener(kind, Arc::new(callback));
    }
}

// ----------------------------------------------------------------------------
// Driver
// ----------------------------------------------------------------------------

/// Drives one send cycle through the documented event sequence
struct Driver {
    inner: Arc<Mutex<Inner>>,
    backend: Arc<dyn Backend>,
    state_tx: Arc<watch::Sender<ReadyState>>,
    progress_chunk: usize,
}

impl Driver {
    async fn run(
        self,
        cycle: u64,
        request: RequestDescriptor,
        mock: Option<ResponseDescriptor>,
        timeout: Option<Duration>,
    ) {
        // Let the sending turn finish before any event fires
        tokio::task::yield_now().await;

        let url = request.url.clone();
        let mocked = mock.is_some();
        let outcome: Result<ResponseDescriptor> = match mock {
            Some(response) => Ok(response),
            None => {
                let fetch = self.backend.fetch(request);
                match timeout {
                    Some(limit) => match tokio::time::timeout(limit, fetch).await {
                        Ok(result) => result,
                        Err(_) => Err(TransportError::Timeout {
                            duration_ms: limit.as_millis() as u64,
                        }
                        .into()),
                    },
                    None => fetch.await,
                }
            }
        };

        match outcome {
            Ok(response) => self.complete(cycle, url, response, mocked),
            Err(error) => {
                let terminal = match &error {
                    XhrError::Transport(TransportError::Timeout { .. }) => EventType::Timeout,
                    _ => EventType::Error,
                };
                tracing::debug!(%error, url = %url, "request failed");
                self.fail(cycle, terminal);
            }
        }
    }

    /// Successful completion: HEADERS_RECEIVED, LOADING, loadstart,
    /// progress (one or more), DONE, load, loadend.
    fn complete(&self, cycle: u64, url: String, mut response: ResponseDescriptor, mocked: bool) {
        // Headers become known
        let snapshot = {
            let mut inner = lock_inner(&self.inner);
            if inner.cycle != cycle {
                return;
            }
            if let Some(mime) = inner.mime_override.clone() {
                // The mock pipeline always honors the override; the real
                // backend only when it reports the capability.
                if mocked || self.backend.capabilities().supports_mime_override {
                    response.headers.set("Content-Type", &mime);
                }
            }
            inner.status = response.status;
            inner.status_text = response.status_text.clone();
            inner.response_headers = response.headers.clone();
            inner.response_url = url;
            let Ok(next) = inner.ready_state.transition(ReadyState::HeadersReceived) else {
                return;
            };
            inner.ready_state = next;
            inner.bridge.snapshot(EventType::ReadyStateChange)
        };
        self.state_tx.send_replace(ReadyState::HeadersReceived);
        events::dispatch(&snapshot, EventType::ReadyStateChange);

        // Body assembly begins
        let (state_snapshot, loadstart_snapshot) = {
            let mut inner = lock_inner(&self.inner);
            if inner.cycle != cycle {
                return;
            }
            let Ok(next) = inner.ready_state.transition(ReadyState::Loading) else {
                return;
            };
            inner.ready_state = next;
            (
                inner.bridge.snapshot(EventType::ReadyStateChange),
                inner.bridge.snapshot(EventType::LoadStart),
            )
        };
        self.state_tx.send_replace(ReadyState::Loading);
        events::dispatch(&state_snapshot, EventType::ReadyStateChange);
        events::dispatch(&loadstart_snapshot, EventType::LoadStart);

        // One progress event per chunk of body bytes, at least one always
        let progress_snapshot = {
            let inner = lock_inner(&self.inner);
            if inner.cycle != cycle {
                return;
            }
            inner.bridge.snapshot(EventType::Progress)
        };
        for _ in 0..progress_ticks(response.body.len(), self.progress_chunk) {
            events::dispatch(&progress_snapshot, EventType::Progress);
        }

        // Terminal state
        let snapshots = {
            let mut inner = lock_inner(&self.inner);
            if inner.cycle != cycle {
                return;
            }
            inner.raw_response = Some(response.body);
            let Ok(next) = inner.ready_state.transition(ReadyState::Done) else {
                return;
            };
            inner.ready_state = next;
            inner.abort_handle = None;
            (
                inner.bridge.snapshot(EventType::ReadyStateChange),
                inner.bridge.snapshot(EventType::Load),
                inner.bridge.snapshot(EventType::LoadEnd),
            )
        };
        self.state_tx.send_replace(ReadyState::Done);
        events::dispatch(&snapshots.0, EventType::ReadyStateChange);
        events::dispatch(&snapshots.1, EventType::Load);
        events::dispatch(&snapshots.2, EventType::LoadEnd);
    }

    /// Failed completion: DONE, then `error` or `timeout`, then loadend.
    /// Never raises; the terminal event is the only failure signal.
    fn fail(&self, cycle: u64, terminal: EventType) {
        let snapshots = {
            let mut inner = lock_inner(&self.inner);
            if inner.cycle != cycle {
                return;
            }
            let Ok(next) = inner.ready_state.transition(ReadyState::Done) else {
                return;
            };
            inner.ready_state = next;
            inner.abort_handle = None;
            (
                inner.bridge.snapshot(EventType::ReadyStateChange),
                inner.bridge.snapshot(terminal),
                inner.bridge.snapshot(EventType::LoadEnd),
            )
        };
        self.state_tx.send_replace(ReadyState::Done);
        events::dispatch(&snapshots.0, EventType::ReadyStateChange);
        events::dispatch(&snapshots.1, terminal);
        events::dispatch(&snapshots.2, EventType::LoadEnd);
    }
}

fn progress_ticks(body_len: usize, chunk: usize) -> usize {
    if chunk == 0 {
        return 1;
    }
    core::cmp::max(1, body_len.div_ceil(chunk))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Backend that answers every request with a fixed response
    struct StaticBackend {
        response: ResponseDescriptor,
        delay: Option<Duration>,
    }

    impl StaticBackend {
        fn new(response: ResponseDescriptor) -> Self {
            Self {
                response,
                delay: None,
            }
        }

        fn slow(response: ResponseDescriptor, delay: Duration) -> Self {
            Self {
                response,
                delay: Some(delay),
            }
        }
    }

    #[async_trait]
    impl Backend for StaticBackend {
        async fn fetch(&self, _request: RequestDescriptor) -> Result<ResponseDescriptor> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.response.clone())
        }
    }

    /// Backend whose every request fails
    struct FailingBackend;

    #[async_trait]
    impl Backend for FailingBackend {
        async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseDescriptor> {
            Err(XhrError::connection_failed(request.url, "connection refused"))
        }
    }

    /// Interceptor matching a single URL
    struct SingleRoute {
        url: String,
        response: ResponseDescriptor,
    }

    impl Interceptor for SingleRoute {
        fn intercept(&self, request: &RequestDescriptor) -> Option<ResponseDescriptor> {
            (request.url == self.url).then(|| self.response.clone())
        }
    }

    fn native_client(response: ResponseDescriptor) -> XhrClient {
        XhrClient::native(
            Arc::new(StaticBackend::new(response)),
            ClientConfig::default(),
        )
    }

    fn record_events(client: &XhrClient) -> Arc<Mutex<Vec<EventType>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        for kind in EventType::ALL {
            let log = Arc::clone(&log);
            client.listen(kind, move |event| log.lock().unwrap().push(event.kind));
        }
        log
    }

    #[tokio::test]
    async fn test_send_before_open_fails_synchronously() {
        let client = native_client(ResponseDescriptor::text("ok"));
        let error = client.send(None).unwrap_err();
        match error {
            XhrError::InvalidState(StateError::SendNotOpened { state }) => {
                assert_eq!(state, ReadyState::Unsent);
            }
            other => panic!("Expected SendNotOpened, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_double_send_fails() {
        let client = native_client(ResponseDescriptor::text("ok"));
        client.open("GET", "/", true).unwrap();
        client.send(None).unwrap();
        assert!(client.send(None).is_err());
    }

    #[tokio::test]
    async fn test_successful_cycle_event_order() {
        let client = native_client(ResponseDescriptor::text("hello"));
        let log = record_events(&client);

        client.open("GET", "/", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                EventType::ReadyStateChange, // OPENED
                EventType::ReadyStateChange, // HEADERS_RECEIVED
                EventType::ReadyStateChange, // LOADING
                EventType::LoadStart,
                EventType::Progress,
                EventType::ReadyStateChange, // DONE
                EventType::Load,
                EventType::LoadEnd,
            ]
        );
        assert_eq!(client.ready_state(), ReadyState::Done);
        assert_eq!(client.status(), 200);
        assert_eq!(client.response_text().unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_mock_route_is_indistinguishable() {
        let interceptor = SingleRoute {
            url: "/api".to_owned(),
            response: ResponseDescriptor::text("mocked").with_header("X-Powered-By", "responder"),
        };
        let client = XhrClient::new(
            Arc::new(FailingBackend),
            Arc::new(interceptor),
            ClientConfig::default(),
        );
        let log = record_events(&client);

        client.open("GET", "/api", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;

        assert_eq!(client.response_text().unwrap(), "mocked");
        assert_eq!(
            client.get_response_header("x-powered-by").as_deref(),
            Some("responder")
        );
        // Same sequence a network-served request produces
        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                EventType::ReadyStateChange,
                EventType::ReadyStateChange,
                EventType::ReadyStateChange,
                EventType::LoadStart,
                EventType::Progress,
                EventType::ReadyStateChange,
                EventType::Load,
                EventType::LoadEnd,
            ]
        );
    }

    #[tokio::test]
    async fn test_unmatched_request_falls_through_to_backend() {
        let interceptor = SingleRoute {
            url: "/api".to_owned(),
            response: ResponseDescriptor::text("mocked"),
        };
        let client = XhrClient::new(
            Arc::new(StaticBackend::new(ResponseDescriptor::text("real"))),
            Arc::new(interceptor),
            ClientConfig::default(),
        );

        client.open("GET", "/other", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;

        assert_eq!(client.response_text().unwrap(), "real");
        assert_eq!(client.get_response_header("X-Powered-By"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_suppresses_load() {
        let client = XhrClient::native(
            Arc::new(StaticBackend::slow(
                ResponseDescriptor::text("late"),
                Duration::from_secs(10),
            )),
            ClientConfig::default(),
        );
        let log = record_events(&client);

        client.open("GET", "/", true).unwrap();
        client.send(None).unwrap();
        client.abort();

        assert_eq!(client.ready_state(), ReadyState::Done);
        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                EventType::ReadyStateChange, // OPENED
                EventType::ReadyStateChange, // DONE
                EventType::Abort,
                EventType::LoadEnd,
            ]
        );
        assert!(!events.contains(&EventType::Load));
    }

    #[tokio::test]
    async fn test_abort_without_send_is_noop() {
        let client = native_client(ResponseDescriptor::text("ok"));
        let log = record_events(&client);

        client.abort();
        client.open("GET", "/", true).unwrap();
        client.abort();

        let events = log.lock().unwrap().clone();
        assert_eq!(events, vec![EventType::ReadyStateChange]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_timeout_event() {
        let client = XhrClient::native(
            Arc::new(StaticBackend::slow(
                ResponseDescriptor::text("late"),
                Duration::from_secs(60),
            )),
            ClientConfig::with_timeout(Duration::from_millis(100)),
        );
        let log = record_events(&client);

        client.open("GET", "/", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;

        let events = log.lock().unwrap().clone();
        assert!(events.contains(&EventType::Timeout));
        assert!(!events.contains(&EventType::Load));
        assert_eq!(events.last(), Some(&EventType::LoadEnd));
    }

    #[tokio::test]
    async fn test_network_failure_fires_error_event() {
        let client = XhrClient::native(Arc::new(FailingBackend), ClientConfig::default());
        let log = record_events(&client);

        client.open("GET", "/", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;

        let events = log.lock().unwrap().clone();
        assert!(events.contains(&EventType::Error));
        assert!(!events.contains(&EventType::Load));
        assert_eq!(client.status(), 0);
    }

    #[tokio::test]
    async fn test_late_listener_misses_past_events_but_not_future_cycles() {
        let client = native_client(ResponseDescriptor::text("ok"));
        client.open("GET", "/", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;

        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let log = Arc::clone(&log);
            client.listen(EventType::Load, move |event| {
                log.lock().unwrap().push(event.kind)
            });
        }
        assert!(log.lock().unwrap().is_empty());

        client.open("GET", "/", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;
        assert_eq!(*log.lock().unwrap(), vec![EventType::Load]);
    }

    #[tokio::test]
    async fn test_instance_reuse_resets_response_state() {
        let client = native_client(
            ResponseDescriptor::text("body").with_header("X-Marker", "present"),
        );
        client.open("GET", "/first", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;
        assert_eq!(client.get_response_header("X-Marker").as_deref(), Some("present"));

        client.open("GET", "/second", true).unwrap();
        assert_eq!(client.ready_state(), ReadyState::Opened);
        assert_eq!(client.status(), 0);
        assert_eq!(client.get_response_header("X-Marker"), None);
        assert_eq!(client.get_all_response_headers(), "");
    }

    #[tokio::test]
    async fn test_set_request_header_only_while_opened() {
        let client = native_client(ResponseDescriptor::text("ok"));
        assert!(client.set_request_header("X-Custom", "v").is_err());

        client.open("GET", "/", true).unwrap();
        client.set_request_header("X-Custom", "v").unwrap();
        client.send(None).unwrap();
        assert!(client.set_request_header("X-Late", "v").is_err());
    }

    #[tokio::test]
    async fn test_response_kind_locked_after_done() {
        let client = native_client(ResponseDescriptor::text("ok"));
        client.open("GET", "/", true).unwrap();
        client.set_response_kind(ResponseKind::ArrayBuffer).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;

        assert!(client.set_response_kind(ResponseKind::Text).is_err());
        match client.response() {
            ResponseBody::Buffer(bytes) => assert_eq!(bytes, b"ok"),
            other => panic!("Expected Buffer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_progress_fires_per_chunk() {
        let config = ClientConfig {
            progress_chunk: 4,
            ..ClientConfig::default()
        };
        let client = XhrClient::native(
            Arc::new(StaticBackend::new(ResponseDescriptor::text("ten bytes!"))),
            config,
        );
        let log = record_events(&client);

        client.open("GET", "/", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;

        let progress = log
            .lock()
            .unwrap()
            .iter()
            .filter(|kind| **kind == EventType::Progress)
            .count();
        assert_eq!(progress, 3); // ceil(10 / 4)
    }

    #[tokio::test]
    async fn test_open_records_async_flag() {
        let client = native_client(ResponseDescriptor::text("ok"));
        client.open("GET", "/", false).unwrap();
        assert!(!client.is_async());
        client.open("GET", "/", true).unwrap();
        assert!(client.is_async());
    }

    #[tokio::test]
    async fn test_response_url_reflects_served_request() {
        let client = native_client(ResponseDescriptor::text("ok"));
        client.open("GET", "/somewhere", true).unwrap();
        client.send(None).unwrap();
        client.wait_done().await;
        assert_eq!(client.response_url(), "/somewhere");
    }
}
