//! Hierarchical navigation coordinator engine for GPUI applications.
//!
//! An in-memory tree of *coordinators*, each owning a *router* over its own
//! route type, implements a universal `navigate` algorithm: given any route
//! issued from anywhere in the tree, either the whole tree transitions
//! atomically to display it, or it is left unchanged and a typed error is
//! reported.
//!
//! Start with [`route::Route`] to define a screen enum, [`coordinator::CoordinatorDelegate`]
//! to say how your coordinator handles its routes, and
//! [`coordinator::Coordinator::new_root`] to build the root of a tree.
//! [`tab_coordinator::TabCoordinator`] and [`flow_orchestrator::FlowOrchestrator`]
//! are specializations for tab bars and Login/MainApp-style flow swaps.
//!
//! With the `gpui-integration` feature (on by default), [`context::CoordinatorHost`]
//! hosts a tree as a `gpui::Global` and [`widgets::CoordinatorOutlet`] renders
//! the currently active route of whichever coordinator it's given.

pub mod coordinator;
pub mod error;
pub mod flow_orchestrator;
pub mod logging;
pub mod route;
pub mod state;
pub mod tab_coordinator;

#[cfg(feature = "gpui-integration")]
pub mod context;
#[cfg(feature = "gpui-integration")]
pub mod widgets;

pub use coordinator::{
    Coordinator, CoordinatorCore, CoordinatorDelegate, CoordinatorNode, NodeHandle,
    PresentationContext, RouteHost, WeakNodeHandle,
};
pub use error::{reset, set_handler, ErrorContext, FlowError, ViewSlot};
pub use flow_orchestrator::FlowOrchestrator;
pub use route::{AnyRoute, NavigationKind, Route};
pub use state::{ChildRef, DetentConfig, NavigationState, Router, RouteSnapshot, SubscriptionId};
pub use tab_coordinator::TabCoordinator;

#[cfg(feature = "gpui-integration")]
pub use context::{init_coordinator_host, CoordinatorHost, UseCoordinator};
#[cfg(feature = "gpui-integration")]
pub use widgets::{CoordinatorOutlet, OpaqueView, ViewFactory};
