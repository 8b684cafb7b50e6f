//! Property surface mirror
//!
//! The native client's full member surface, declared statically as a trait
//! so parity between native-wired and patched instances is enforced at
//! compile time (both are [`XhrClient`]). The member-name list is kept for
//! runtime enumeration regression checks only, never as production logic.

use core::time::Duration;

use crate::client::XhrClient;
use crate::coerce::{ResponseBody, ResponseKind};
use crate::errors::Result;
use crate::events::{EventCallback, EventType};
use crate::state::ReadyState;

/// Every member a native instance exposes, by its surface name
pub const SURFACE_MEMBERS: &[&str] = &[
    "readyState",
    "responseType",
    "response",
    "responseText",
    "responseURL",
    "status",
    "statusText",
    "withCredentials",
    "timeout",
    "open",
    "send",
    "setRequestHeader",
    "getResponseHeader",
    "getAllResponseHeaders",
    "overrideMimeType",
    "abort",
    "addEventListener",
    "onreadystatechange",
    "onloadstart",
    "onprogress",
    "onload",
    "onloadend",
    "onerror",
    "ontimeout",
    "onabort",
];

/// The full native-compatible surface
pub trait ClientSurface {
    fn ready_state(&self) -> ReadyState;
    fn response_kind(&self) -> ResponseKind;
    fn set_response_kind(&self, kind: ResponseKind) -> Result<()>;
    fn response(&self) -> ResponseBody;
    fn response_text(&self) -> Option<String>;
    fn response_url(&self) -> String;
    fn status(&self) -> u16;
    fn status_text(&self) -> String;
    fn with_credentials(&self) -> bool;
    fn set_with_credentials(&self, enabled: bool);
    fn timeout(&self) -> Option<Duration>;
    fn set_timeout(&self, timeout: Option<Duration>);
    fn open(&self, method: &str, url: &str, async_flag: bool) -> Result<()>;
    fn send(&self, body: Option<Vec<u8>>) -> Result<()>;
    fn set_request_header(&self, name: &str, value: &str) -> Result<()>;
    fn get_response_header(&self, name: &str) -> Option<String>;
    fn get_all_response_headers(&self) -> String;
    fn override_mime_type(&self, mime: &str) -> Result<()>;
    fn abort(&self);
    fn add_event_listener(&self, kind: EventType, callback: EventCallback);
    fn set_event_handler(&self, kind: EventType, callback: Option<EventCallback>);

    /// Member names this instance exposes, for enumeration regression checks
    fn surface_members(&self) -> &'static [&'static str] {
        SURFACE_MEMBERS
    }
}

impl ClientSurface for XhrClient {
    fn ready_state(&self) -> ReadyState {
        XhrClient::ready_state(self)
    }

    fn response_kind(&self) -> ResponseKind {
        XhrClient::response_kind(self)
    }

    fn set_response_kind(&self, kind: ResponseKind) -> Result<()> {
        XhrClient::set_response_kind(self, kind)
    }

    fn response(&self) -> ResponseBody {
        XhrClient::response(self)
    }

    fn response_text(&self) -> Option<String> {
        XhrClient::response_text(self)
    }

    fn response_url(&self) -> String {
        XhrClient::response_url(self)
    }

    fn status(&self) -> u16 {
        XhrClient::status(self)
    }

    fn status_text(&self) -> String {
        XhrClient::status_text(self)
    }

    fn with_credentials(&self) -> bool {
        XhrClient::with_credentials(self)
    }

    fn set_with_credentials(&self, enabled: bool) {
        XhrClient::set_with_credentials(self, enabled)
    }

    fn timeout(&self) -> Option<Duration> {
        XhrClient::timeout(self)
    }

    fn set_timeout(&self, timeout: Option<Duration>) {
        XhrClient::set_timeout(self, timeout)
    }

    fn open(&self, method: &str, url: &str, async_flag: bool) -> Result<()> {
        XhrClient::open(self, method, url, async_flag)
    }

    fn send(&self, body: Option<Vec<u8>>) -> Result<()> {
        XhrClient::send(self, body)
    }

    fn set_request_header(&self, name: &str, value: &str) -> Result<()> {
        XhrClient::set_request_header(self, name, value)
    }

    fn get_response_header(&self, name: &str) -> Option<String> {
        XhrClient::get_response_header(self, name)
    }

    fn get_all_response_headers(&self) -> String {
        XhrClient::get_all_response_headers(self)
    }

    fn override_mime_type(&self, mime: &str) -> Result<()> {
        XhrClient::override_mime_type(self, mime)
    }

    fn abort(&self) {
        XhrClient::abort(self)
    }

    fn add_event_listener(&self, kind: EventType, callback: EventCallback) {
        XhrClient::add_event_listener(self, kind, callback)
    }

    fn set_event_handler(&self, kind: EventType, callback: Option<EventCallback>) {
        XhrClient::set_event_handler(self, kind, callback)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
