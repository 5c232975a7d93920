//! Error handling for the coordinator engine.
//!
//! This module defines the types reported when a navigation attempt, a
//! construction-time operation, or a view-creation attempt cannot complete:
//!
//! - [`FlowError`] — the typed error taxonomy (§7).
//! - [`ErrorContext`] — the `coordinator` / `route` / `route_type` triple
//!   every variant carries.
//! - The global reporter — a process-wide singleton ([`set_handler`],
//!   [`reset`]) the engine calls synchronously whenever an error occurs.
//!
//! # Examples
//!
//! ```
//! use gpui_flow_coordinator::error::{set_handler, reset, FlowError};
//!
//! set_handler(|err| {
//!     eprintln!("navigation error: {err}");
//! });
//!
//! // ... later, at shutdown or in a test teardown ...
//! reset();
//! ```

use std::fmt;
use std::sync::{OnceLock, RwLock};

// ============================================================================
// Error Context
// ============================================================================

/// Identifying context every [`FlowError`] variant carries: which
/// coordinator raised it, which route was involved, and that route's
/// concrete type name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub coordinator: String,
    pub route: String,
    pub route_type: String,
}

impl ErrorContext {
    pub fn new(
        coordinator: impl Into<String>,
        route: impl Into<String>,
        route_type: impl Into<String>,
    ) -> Self {
        Self {
            coordinator: coordinator.into(),
            route: route.into(),
            route_type: route_type.into(),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "coordinator={}, route={}, route_type={}",
            self.coordinator, self.route, self.route_type
        )
    }
}

// ============================================================================
// View-creation context
// ============================================================================

/// Which presentation slot a failed view-creation attempt was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSlot {
    Root,
    Pushed,
    Modal,
    Detour,
}

impl fmt::Display for ViewSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewSlot::Root => write!(f, "root"),
            ViewSlot::Pushed => write!(f, "pushed"),
            ViewSlot::Modal => write!(f, "modal"),
            ViewSlot::Detour => write!(f, "detour"),
        }
    }
}

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Typed errors the engine can report. Every variant carries an
/// [`ErrorContext`] identifying the coordinator and route involved.
///
/// `navigate` never panics and never propagates these as `Result` — it
/// returns `bool` (per §4.2) and reports the error, if any, to the global
/// handler (§7).
#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    /// No coordinator in the hierarchy can handle the route and no
    /// flow-change absorbed it.
    NavigationFailed(ErrorContext),
    /// `navigation_type(r)` returned `Modal` but no matching modal
    /// coordinator is registered.
    ModalCoordinatorNotConfigured(ErrorContext),
    /// An attempt was made to route a detour through `navigate`; detours
    /// must be entered via the explicit `present_detour` operation.
    InvalidDetourNavigation(ErrorContext),
    /// The view factory returned no view for a route the engine tried to
    /// display.
    ViewCreationFailed(ErrorContext, ViewSlot),
    /// A coordinator was asked to adopt itself as a child.
    CircularReference(ErrorContext),
    /// A coordinator already present in `internal_children` was added
    /// again.
    DuplicateChild(ErrorContext),
    /// `switch_to_tab` was called with an index outside `0..valid_range`.
    InvalidTabIndex {
        context: ErrorContext,
        index: u32,
        valid_range: std::ops::Range<u32>,
    },
    /// Generic programmer-misuse channel (e.g. missing `tab_item`).
    ConfigurationError(ErrorContext, String),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::NavigationFailed(ctx) => {
                write!(f, "navigation failed: no coordinator can handle it ({ctx})")
            }
            FlowError::ModalCoordinatorNotConfigured(ctx) => {
                write!(f, "modal coordinator not configured ({ctx})")
            }
            FlowError::InvalidDetourNavigation(ctx) => {
                write!(f, "detours must be entered via present_detour, not navigate ({ctx})")
            }
            FlowError::ViewCreationFailed(ctx, slot) => {
                write!(f, "view creation failed for {slot} view ({ctx})")
            }
            FlowError::CircularReference(ctx) => {
                write!(f, "coordinator cannot adopt itself as a child ({ctx})")
            }
            FlowError::DuplicateChild(ctx) => {
                write!(f, "child already present in internal_children ({ctx})")
            }
            FlowError::InvalidTabIndex {
                context,
                index,
                valid_range,
            } => write!(
                f,
                "invalid tab index {index}, valid range is {}..{} ({context})",
                valid_range.start, valid_range.end
            ),
            FlowError::ConfigurationError(ctx, message) => {
                write!(f, "configuration error: {message} ({ctx})")
            }
        }
    }
}

impl std::error::Error for FlowError {}

// ============================================================================
// Global error reporter
// ============================================================================

/// Handler invoked synchronously whenever the engine reports a [`FlowError`].
pub type Handler = Box<dyn Fn(&FlowError) + Send + Sync>;

static HANDLER: OnceLock<RwLock<Option<Handler>>> = OnceLock::new();

fn slot() -> &'static RwLock<Option<Handler>> {
    HANDLER.get_or_init(|| RwLock::new(None))
}

/// Install the process-wide error handler. Replaces any previously set
/// handler. Call once at app init; the default, before any handler is set,
/// is silent (errors are dropped).
pub fn set_handler(handler: impl Fn(&FlowError) + Send + Sync + 'static) {
    *slot().write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Box::new(handler));
}

/// Clear the process-wide error handler. Subsequent errors are reported
/// to nobody until `set_handler` is called again.
pub fn reset() {
    *slot().write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
}

/// Report an error to the current handler, if one is set. Called
/// internally by the coordinator engine; exposed so a host can route
/// its own `ConfigurationError`s through the same channel.
pub fn report(error: &FlowError) {
    crate::error_log!("flow error: {error}");
    if let Ok(guard) = slot().read() {
        if let Some(handler) = guard.as_ref() {
            handler(error);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    // Global reporter tests mutate process-wide state; serialize via a
    // lock so `cargo test`'s default multi-threaded runner doesn't race.
    static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn context_display_includes_all_fields() {
        let ctx = ErrorContext::new("Root", "detail/1", "Demo");
        assert_eq!(ctx.to_string(), "coordinator=Root, route=detail/1, route_type=Demo");
    }

    #[test]
    fn navigation_failed_display() {
        let err = FlowError::NavigationFailed(ErrorContext::new("Root", "x", "Demo"));
        assert!(err.to_string().starts_with("navigation failed"));
    }

    #[test]
    fn handler_receives_reported_errors() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset();

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        set_handler(move |err| received_clone.lock().unwrap().push(err.clone()));

        let err = FlowError::CircularReference(ErrorContext::new("Tab2", "tab2", "TabRoute"));
        report(&err);

        assert_eq!(received.lock().unwrap().len(), 1);
        assert_eq!(received.lock().unwrap()[0], err);

        reset();
    }

    #[test]
    fn reset_silences_subsequent_errors() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let received = Arc::new(Mutex::new(0));
        let received_clone = received.clone();
        set_handler(move |_| *received_clone.lock().unwrap() += 1);
        reset();

        report(&FlowError::ConfigurationError(
            ErrorContext::default(),
            "missing tab_item".into(),
        ));

        assert_eq!(*received.lock().unwrap(), 0);
    }

    // A `navigate()` call that fails purely during the validation pass never
    // reaches the execution pass (§4.2) — so the report has to come from the
    // validation branch itself, not a later "else report and return false".
    #[derive(Debug, Clone, PartialEq)]
    enum Demo {
        Home,
        Settings,
    }

    impl crate::route::Route for Demo {
        fn identifier(&self) -> String {
            match self {
                Demo::Home => "home".into(),
                Demo::Settings => "settings".into(),
            }
        }
    }

    struct NeverHandle;
    impl crate::coordinator::CoordinatorDelegate<Demo> for NeverHandle {
        fn can_handle(&self, _route: &Demo) -> bool {
            false
        }
        fn navigation_type(&self, _route: &Demo) -> crate::route::NavigationKind {
            crate::route::NavigationKind::Push
        }
    }

    #[test]
    fn validation_only_failure_still_reports_navigation_failed() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        reset();

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        set_handler(move |err| received_clone.lock().unwrap().push(err.clone()));

        use crate::coordinator::CoordinatorNode;
        let root = crate::coordinator::Coordinator::new_root(Demo::Home, NeverHandle, "Root");
        let accepted = root
            .borrow_mut()
            .navigate(&crate::route::AnyRoute::new(Demo::Settings), None);

        assert!(!accepted);
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert!(matches!(received[0], FlowError::NavigationFailed(_)));

        drop(received);
        reset();
    }
}
