use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------- Flow log records ------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Action {
    Allow,
    Deny,
    Pass,
    #[default]
    Unknown,
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "allow" => Action::Allow,
            "deny" => Action::Deny,
            "pass" => Action::Pass,
            _ => Action::Unknown,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Allow => "Allow",
            Action::Deny => "Deny",
            Action::Pass => "Pass",
            Action::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyHit {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub tier: String,
    pub action: Action,
    pub policy_index: i64,
    pub rule_index: i64,
    pub trigger: Option<Box<PolicyHit>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTrace {
    pub enforced: Vec<PolicyHit>,
    pub pending: Vec<PolicyHit>,
}

/// One aggregated flow as reported by the whisker backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowLog {
    /// Client-side row id, not part of the wire format.
    #[serde(skip)]
    pub id: Uuid,
    pub start_time: String,
    pub end_time: String,
    pub action: Action,
    pub source_name: String,
    pub source_namespace: String,
    pub source_labels: String,
    pub dest_name: String,
    pub dest_namespace: String,
    pub dest_labels: String,
    pub protocol: String,
    pub dest_port: u16,
    pub reporter: String,
    pub policies: PolicyTrace,
    pub packets_in: u64,
    pub packets_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl FlowLog {
    /// Decode a record from the backend and give it a fresh row id.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        let mut flow: FlowLog = serde_json::from_str(data)?;
        flow.id = Uuid::new_v4();
        Ok(flow)
    }

    pub fn is_denied(&self) -> bool {
        self.action == Action::Deny
    }
}

/// Error reported by the flow log API, shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

// ---------- View state shared with routed children ------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowLogsView {
    #[default]
    All,
    Denied,
}

/// Newest-first buffer. Records are shared so copy-on-write only copies pointers.
pub type FlowLogs = Rc<VecDeque<Rc<FlowLog>>>;

/// Zero-argument row click callback. Two handlers are equal only when they
/// share the same closure.
#[derive(Clone)]
pub struct RowClickHandler(Rc<dyn Fn()>);

impl RowClickHandler {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl PartialEq for RowClickHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RowClickHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RowClickHandler")
    }
}

/// What the flow logs layout hands to its routed child.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowLogsContext {
    pub view: FlowLogsView,
    pub flow_logs: FlowLogs,
    pub error: Option<Rc<ApiError>>,
    pub on_row_clicked: RowClickHandler,
}
