//! Request and response envelopes.
//!
//! Every call to the people endpoint is a single `Request` naming an
//! action plus whichever of `obj`, `query` and `updates` that action needs.
//! Replies are a `Response` carrying either `data` or `error`.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::constants::{DEFAULT_FIND_COUNT, DEFAULT_START_OFFSET, ID_FIELD};
use crate::types::{Conditions, Error, Fields, Record, Sort};

/// Operations the dispatch layer accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Insert a new record
    Create,
    /// Fetch one record by id
    Read,
    /// Overwrite an existing record
    Replace,
    /// Apply a field command to one record
    Update,
    /// Remove one record by id
    Delete,
    /// List records matching conditions
    Find,
}

impl Action {
    /// Every accepted action
    pub const ALL: [Action; 6] = [
        Action::Create,
        Action::Read,
        Action::Replace,
        Action::Update,
        Action::Delete,
        Action::Find,
    ];

    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Replace => "replace",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Find => "find",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::bad_request(format!("unrecognized action: {}", s)))
    }
}

/// Pagination window over a result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Index of the first item to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<usize>,
    /// Maximum number of items to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Cursor {
    /// Cursor with both bounds set
    pub fn new(start_offset: usize, count: usize) -> Self {
        Self { start_offset: Some(start_offset), count: Some(count) }
    }

    /// Resolve an optional cursor to `(start, count)`.
    ///
    /// A zero count counts as unset, matching clients that send `0` for
    /// "no preference".
    pub fn window(cursor: Option<&Cursor>) -> (usize, usize) {
        let start = cursor.and_then(|c| c.start_offset).unwrap_or(DEFAULT_START_OFFSET);
        let count = cursor
            .and_then(|c| c.count)
            .filter(|count| *count > 0)
            .unwrap_or(DEFAULT_FIND_COUNT);
        (start, count)
    }
}

/// Query part of a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Single-field equality conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,
    /// Record ids the request targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    /// Projection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Fields>,
    /// Ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    /// Pagination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl Query {
    /// Query with the given conditions only
    pub fn with_conditions(conditions: Conditions) -> Self {
        Self { conditions: Some(conditions), ..Default::default() }
    }

    /// Query targeting a single id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { ids: Some(vec![id.into()]), ..Default::default() }
    }

    /// First id listed in `ids`
    pub fn first_id(&self) -> Option<&str> {
        self.ids.as_ref().and_then(|ids| ids.first()).map(String::as_str)
    }

    /// `_id` named in the conditions
    pub fn condition_id(&self) -> Option<&str> {
        self.conditions.as_ref().and_then(|c| c.get(ID_FIELD)).and_then(Value::as_str)
    }
}

/// Field update commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateCmd {
    /// Assign a value to a field
    Set,
    /// Remove a field
    Unset,
    /// Insert an element into an array field
    Insert,
    /// Remove an element from an array field
    Remove,
}

/// A single named-field mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFieldCommand {
    /// What to do
    pub cmd: UpdateCmd,
    /// Field to do it to
    pub field: String,
    /// Value for `set`/`insert`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl UpdateFieldCommand {
    /// `set` command
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { cmd: UpdateCmd::Set, field: field.into(), value: Some(value.into()) }
    }

    /// `unset` command
    pub fn unset(field: impl Into<String>) -> Self {
        Self { cmd: UpdateCmd::Unset, field: field.into(), value: None }
    }
}

/// Generic request envelope.
///
/// `action` stays a plain string on the wire so that unrecognized names
/// reach the dispatcher and can be rejected there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Name of the action to run
    pub action: String,
    /// Record payload for create/replace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj: Option<Record>,
    /// Query payload for read/update/delete/find
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    /// Update commands for update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<Vec<UpdateFieldCommand>>,
}

impl Request {
    /// Empty request for an action
    pub fn new(action: Action) -> Self {
        Self { action: action.as_str().to_string(), obj: None, query: None, updates: None }
    }

    /// `create` request
    pub fn create(obj: Record) -> Self {
        Self { obj: Some(obj), ..Self::new(Action::Create) }
    }

    /// `read` request
    pub fn read(id: impl Into<String>) -> Self {
        Self { query: Some(Query::with_id(id)), ..Self::new(Action::Read) }
    }

    /// `replace` request
    pub fn replace(obj: Record) -> Self {
        Self { obj: Some(obj), ..Self::new(Action::Replace) }
    }

    /// `update` request for the record with the given id
    pub fn update(id: impl Into<String>, updates: Vec<UpdateFieldCommand>) -> Self {
        let mut conditions = Conditions::new();
        conditions.insert(ID_FIELD.to_string(), Value::String(id.into()));
        Self {
            query: Some(Query::with_conditions(conditions)),
            updates: Some(updates),
            ..Self::new(Action::Update)
        }
    }

    /// `delete` request
    pub fn delete(id: impl Into<String>) -> Self {
        Self { query: Some(Query::with_id(id)), ..Self::new(Action::Delete) }
    }

    /// `find` request
    pub fn find(query: Query) -> Self {
        Self { query: Some(query), ..Self::new(Action::Find) }
    }

    /// Parse the action name against the whitelist
    pub fn parsed_action(&self) -> Result<Action, Error> {
        self.action.parse()
    }

    /// Id targeted by a read: `query.ids[0]`, else `obj._id`
    pub fn read_id(&self) -> Option<&str> {
        self.query
            .as_ref()
            .and_then(Query::first_id)
            .or_else(|| self.obj.as_ref().and_then(Record::id))
    }

    /// Id targeted by a delete: `query.ids[0]`, else `query.conditions._id`
    pub fn delete_id(&self) -> Option<&str> {
        let query = self.query.as_ref()?;
        query.first_id().or_else(|| query.condition_id())
    }
}

/// Success payload: one record or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    /// Single record (create/read/replace/update)
    Record(Record),
    /// Record list (find)
    Records(Vec<Record>),
}

/// Error payload sent in non-production configurations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error message
    pub message: String,
    /// Error and cause chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl From<&Error> for ErrorBody {
    fn from(error: &Error) -> Self {
        Self { message: error.to_string(), stack: Some(error.stack()) }
    }
}

/// Generic response envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Result of a successful action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    /// Failure details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    /// Successful response with a payload
    pub fn data(data: Data) -> Self {
        Self { data: Some(data), error: None }
    }

    /// Successful response without a payload
    pub fn empty() -> Self {
        Self::default()
    }

    /// Failed response
    pub fn error(error: ErrorBody) -> Self {
        Self { data: None, error: Some(error) }
    }
}

impl From<Data> for Value {
    fn from(data: Data) -> Self {
        match data {
            Data::Record(record) => record.into(),
            Data::Records(records) => json!(records),
        }
    }
}
