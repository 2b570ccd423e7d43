//! Fake remote backend installed into the page.
//!
//! The dashboard talks to its server through `google.script.run`. A
//! [`BackendStub`] replaces that object with a runner whose methods answer
//! from a fixed reply table. `withSuccessHandler` and `withFailureHandler`
//! return a new runner each time, so handlers never leak between call sites.
//!
//! The same table is evaluable from Rust through [`BackendStub::respond`].

use serde_json::{json, Value};

use crate::locator::js_string;
use crate::result::{DashcamError, DashcamResult};

/// Session code replied by the demo backend
pub const DEFAULT_SESSION_CODE: &str = "DEMO12";

/// What a stubbed method does when called
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Call the success handler with a literal payload
    Fixed(Value),
    /// `{success: true, code, data: JSON.parse(arg0)}`
    SessionCreated {
        /// Session code to hand out
        code: String,
    },
    /// `{success: true, paused: arg1}`
    PausedEcho,
    /// `console.log(message)` without a callback
    Log(String),
    /// Do nothing
    Silent,
}

impl Reply {
    fn to_js(&self) -> String {
        match self {
            Self::Fixed(payload) => format!(
                "function () {{ if (this._success) {{ this._success({payload}); }} }}"
            ),
            Self::SessionCreated { code } => format!(
                "function (data) {{ if (this._success) {{ this._success({{ success: true, code: {}, data: JSON.parse(data) }}); }} }}",
                js_string(code)
            ),
            Self::PausedEcho => "function (code, paused) { if (this._success) { this._success({ success: true, paused: paused }); } }".to_string(),
            Self::Log(message) => format!("function () {{ console.log({}); }}", js_string(message)),
            Self::Silent => "function () {}".to_string(),
        }
    }
}

/// When the stub is installed relative to page load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallTiming {
    /// Init script, before any page script runs
    BeforeLoad,
    /// Evaluated once the document has loaded
    #[default]
    AfterLoad,
}

/// A fake `google.script.run`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendStub {
    methods: Vec<(String, Reply)>,
}

impl BackendStub {
    /// Stub with no methods
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a method
    #[must_use]
    pub fn with_method(mut self, name: impl Into<String>, reply: Reply) -> Self {
        let name = name.into();
        match self.methods.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = reply,
            None => self.methods.push((name, reply)),
        }
        self
    }

    /// The full backend surface used by the recording suite
    #[must_use]
    pub fn demo(code: &str) -> Self {
        Self::new()
            .with_method(
                "createSession",
                Reply::SessionCreated {
                    code: code.to_string(),
                },
            )
            .with_method(
                "joinSession",
                Reply::Fixed(json!({
                    "success": true,
                    "data": {
                        "bg": "bg-slate-900",
                        "widgets": [{
                            "id": "t1", "type": "clock",
                            "x": 100, "y": 100, "w": 280, "h": 160, "z": 1,
                            "allowInteraction": false,
                            "data": { "is24h": false, "showSeconds": true }
                        }],
                        "polls": {}
                    }
                })),
            )
            .with_method(
                "getSessionData",
                Reply::Fixed(json!({
                    "success": true,
                    "active": true,
                    "data": {
                        "paused": false,
                        "widgets": [],
                        "polls": { "poll-1": { "A": 5, "B": 3 } }
                    }
                })),
            )
            .with_method("updateSession", Reply::Log("Session updated".to_string()))
            .with_method("setSessionPaused", Reply::PausedEcho)
            .with_method("endSession", Reply::Fixed(json!({ "success": true })))
            .with_method(
                "saveDashboard",
                Reply::Fixed(json!({ "success": true, "message": "Saved!" })),
            )
            .with_method(
                "getDashboards",
                Reply::Fixed(Value::String(
                    json!({ "My Saved Dashboard": { "bg": "bg-slate-900", "widgets": [] } })
                        .to_string(),
                )),
            )
            .with_method("updateWidgetState", Reply::Log("Widget updated".to_string()))
            .with_method(
                "submitPollResponse",
                Reply::Fixed(json!({ "success": true, "polls": { "A": 1, "B": 0 } })),
            )
            .with_method(
                "getScriptUrl",
                Reply::Fixed(Value::String(
                    "https://script.google.com/macros/s/...".to_string(),
                )),
            )
    }

    /// Session start/pause only
    #[must_use]
    pub fn live_session(code: &str) -> Self {
        Self::new()
            .with_method(
                "createSession",
                Reply::SessionCreated {
                    code: code.to_string(),
                },
            )
            .with_method("updateSession", Reply::Log("Session updated".to_string()))
            .with_method("setSessionPaused", Reply::PausedEcho)
            .with_method("getDashboards", empty_dashboards())
    }

    /// Dashboard list and save
    #[must_use]
    pub fn dashboards_only() -> Self {
        Self::new()
            .with_method("getDashboards", empty_dashboards())
            .with_method("saveDashboard", Reply::Fixed(json!({ "success": true })))
    }

    /// Dashboards plus silent rename/delete
    #[must_use]
    pub fn widget_gallery() -> Self {
        Self::dashboards_only()
            .with_method("renameDashboard", Reply::Silent)
            .with_method("deleteDashboard", Reply::Silent)
    }

    /// Methods exist but never answer
    #[must_use]
    pub fn inert() -> Self {
        Self::new()
            .with_method("getDashboards", Reply::Silent)
            .with_method("createSession", Reply::Silent)
    }

    /// Names of the stubbed methods, in definition order
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|(n, _)| n.as_str())
    }

    /// Reply configured for a method
    #[must_use]
    pub fn reply_for(&self, method: &str) -> Option<&Reply> {
        self.methods.iter().find(|(n, _)| n == method).map(|(_, r)| r)
    }

    /// Payload the success handler would receive for a call, if any
    pub fn respond(&self, method: &str, args: &[Value]) -> DashcamResult<Option<Value>> {
        let reply = self
            .reply_for(method)
            .ok_or_else(|| DashcamError::UnknownStubMethod {
                method: method.to_string(),
            })?;
        match reply {
            Reply::Fixed(payload) => Ok(Some(payload.clone())),
            Reply::SessionCreated { code } => {
                let text = args.first().and_then(Value::as_str).ok_or_else(|| {
                    DashcamError::script(format!("{method} expects JSON-encoded session data"))
                })?;
                let data: Value = serde_json::from_str(text)?;
                Ok(Some(json!({ "success": true, "code": code, "data": data })))
            }
            Reply::PausedEcho => Ok(Some(json!({
                "success": true,
                "paused": args.get(1).cloned().unwrap_or(Value::Null)
            }))),
            Reply::Log(_) | Reply::Silent => Ok(None),
        }
    }

    fn runner_js(&self) -> String {
        let mut js = String::from(
            "function Runner(success, failure) { this._success = success; this._failure = failure; } \
             Runner.prototype.withSuccessHandler = function (cb) { return new Runner(cb, this._failure); }; \
             Runner.prototype.withFailureHandler = function (cb) { return new Runner(this._success, cb); };",
        );
        for (name, reply) in &self.methods {
            js.push_str(&format!(" Runner.prototype[{}] = {};", js_string(name), reply.to_js()));
        }
        js.push_str(" window.google = { script: { run: new Runner(null, null) } };");
        js
    }

    /// Script installing the stub for the given timing
    ///
    /// After load, a placeholder `spawnWidget` that throws is added unless the
    /// application already defined one. Before load it is left out, since the
    /// application has not had the chance to define its own yet.
    #[must_use]
    pub fn script(&self, timing: InstallTiming) -> String {
        let guard = match timing {
            InstallTiming::BeforeLoad => "",
            InstallTiming::AfterLoad => {
                " window.spawnWidget = window.spawnWidget || function () { throw new Error('spawnWidget called before it is ready'); };"
            }
        };
        format!("(() => {{ {}{guard} }})();", self.runner_js())
    }
}

fn empty_dashboards() -> Reply {
    Reply::Fixed(Value::String("{}".to_string()))
}
