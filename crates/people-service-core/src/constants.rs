//! Global constants used throughout the people service
//!
//! This module contains compile-time constants that are shared across
//! the core, server and client crates to avoid magic numbers.

/// Name of the identity field carried by every stored record
pub const ID_FIELD: &str = "_id";

/// Length of an ObjectId in bytes
///
/// Layout: 4-byte timestamp, 5-byte generator-unique value, 3-byte counter.
pub const OBJECT_ID_LENGTH: usize = 12;

/// Length of the hex representation of an ObjectId
pub const OBJECT_ID_HEX_LENGTH: usize = OBJECT_ID_LENGTH * 2;

/// Counter values wrap at 24 bits
pub const OBJECT_ID_COUNTER_MASK: u32 = 0x00ff_ffff;

/// Page size used by `find` when the cursor does not carry a count
pub const DEFAULT_FIND_COUNT: usize = 10;

/// Offset used by `find` when the cursor does not carry a start offset
pub const DEFAULT_START_OFFSET: usize = 0;

/// Default JSON body limit for the people endpoint (100kb)
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// Default HTTP bind address for the server
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

/// Path of the people endpoint
pub const PEOPLE_API_PATH: &str = "/api/people";

/// Default URL used by clients of the people endpoint
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3000/api/people";

/// Default client request timeout in milliseconds
pub const DEFAULT_CLIENT_TIMEOUT_MS: u64 = 1_000;

/// Default database name for the people store
pub const DEFAULT_DB_NAME: &str = "people";

/// Default type name of records held by the people store
pub const DEFAULT_DB_TYPENAME: &str = "Person";
