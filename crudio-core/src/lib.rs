//! CRUD.io Core - Content Types
//!
//! Data structures, the output renderer, and the transport contract shared by
//! every other crate in the workspace. Nothing in here performs I/O.

pub mod content;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod render;
pub mod transport;

pub use content::{CacheRecord, ContentMap, ContentType, RawPayload};
pub use error::{ConfigError, CrudError, CrudResult};
pub use handlers::{Delivered, ErrorFn, Handlers, ResolvedHandlers, SuccessFn};
pub use identity::NodeKey;
pub use render::{escape_html, render, render_record, render_text, Rendered};
pub use transport::{Envelope, ErrorBody, Method, Transport};

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// FIXED MESSAGES
// ============================================================================

/// Delivered to error handlers when a single-node fetch fails below the
/// application layer, or when `get` is called without a node.
pub const GET_FAILURE_MESSAGE: &str = "Unable to get from content cloud.";

/// Delivered to error handlers when a collection load fails below the
/// application layer.
pub const LOAD_FAILURE_MESSAGE: &str = "Unable to load from content cloud.";

/// Placeholder text returned by `read` for a node that is not cached.
pub fn unloaded_node_message(node: &str) -> String {
    format!(
        "The node ({}) was not loaded. Make sure it is included in your CMS, \
         or force another load with crud.get.",
        node
    )
}
