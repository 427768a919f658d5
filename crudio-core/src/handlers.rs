//! Completion handlers for the callback-style client API.
//!
//! A handler is resolved through a fixed chain: the handlers passed with the
//! call, then the client's instance handlers, then
//! [`Handlers::process_default`], which only logs.

use crate::content::ContentMap;
use crate::render::Rendered;
use std::fmt;
use std::sync::Arc;

/// Value handed to a success handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivered {
    /// A single rendered node from `get`.
    Node(Rendered),
    /// The structured content map merged by `load`.
    Collection(ContentMap),
}

impl Delivered {
    pub fn as_node(&self) -> Option<&Rendered> {
        match self {
            Self::Node(rendered) => Some(rendered),
            Self::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&ContentMap> {
        match self {
            Self::Collection(content) => Some(content),
            Self::Node(_) => None,
        }
    }
}

pub type SuccessFn = Arc<dyn Fn(Delivered) + Send + Sync>;
pub type ErrorFn = Arc<dyn Fn(Rendered) + Send + Sync>;

/// Optional success and error handlers.
#[derive(Clone, Default)]
pub struct Handlers {
    pub on_success: Option<SuccessFn>,
    pub on_error: Option<ErrorFn>,
}

impl Handlers {
    /// No handlers; every slot falls through to the next link in the chain.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl Fn(Delivered) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(Rendered) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Last-resort handlers. Success is logged at `info` for diagnostic
    /// visibility; errors are logged at `error`.
    pub fn process_default() -> Self {
        Self {
            on_success: Some(Arc::new(log_unhandled_success)),
            on_error: Some(Arc::new(log_unhandled_error)),
        }
    }

    /// Resolve `explicit` over `instance` over the process defaults.
    pub fn resolve(explicit: &Handlers, instance: &Handlers) -> ResolvedHandlers {
        let on_success = explicit
            .on_success
            .clone()
            .or_else(|| instance.on_success.clone())
            .unwrap_or_else(|| Arc::new(log_unhandled_success));
        let on_error = explicit
            .on_error
            .clone()
            .or_else(|| instance.on_error.clone())
            .unwrap_or_else(|| Arc::new(log_unhandled_error));
        ResolvedHandlers {
            on_success,
            on_error,
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Handlers with every slot filled.
#[derive(Clone)]
pub struct ResolvedHandlers {
    on_success: SuccessFn,
    on_error: ErrorFn,
}

impl ResolvedHandlers {
    pub fn success(&self, delivered: Delivered) {
        (self.on_success)(delivered)
    }

    pub fn error(&self, rendered: Rendered) {
        (self.on_error)(rendered)
    }
}

fn log_unhandled_success(delivered: Delivered) {
    tracing::info!(
        result = ?delivered,
        "No callback handler was specified, but the server said"
    );
}

fn log_unhandled_error(rendered: Rendered) {
    tracing::error!(error = %rendered, "Unhandled content cloud failure");
}
