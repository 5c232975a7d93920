//! Coordinator-tree host integration for GPUI.
//!
//! A navigation tree is rooted in one [`NodeHandle`](crate::coordinator::NodeHandle)
//! per running app. This module stores that handle as a GPUI [`Global`] so it
//! can be reached from any view without threading it through constructors:
//!
//! - [`CoordinatorHost`] — the `Global` wrapper around the root handle.
//! - [`UseCoordinator`] — an extension trait for `App` to read/replace it.
//! - [`init_coordinator_host`] — sets it up once at app startup.
//!
//! # Initialization
//!
//! ```ignore
//! use gpui_flow_coordinator::{init_coordinator_host, Coordinator};
//!
//! let root = Coordinator::new_root(AppRoute::Login, delegate, "App");
//! init_coordinator_host(cx, root);
//! ```

use crate::coordinator::{CoordinatorNode, NodeHandle};
use crate::route::AnyRoute;
use gpui::{App, BorrowAppContext, Global};

/// The process-wide coordinator tree root, stored as a GPUI global.
///
/// Holds one [`NodeHandle`] — the `Rc<RefCell<dyn CoordinatorNode>>` at the
/// root of the tree. Mirrors the teacher's `GlobalRouter`, narrowed to hold
/// a coordinator-tree handle instead of a flat path-based `RouterState`; the
/// guard/middleware/redirect pipeline has no counterpart here because the
/// coordinator engine's own two-phase validate/execute protocol already
/// serves the role that pipeline served.
#[derive(Clone)]
pub struct CoordinatorHost {
    root: NodeHandle,
}

impl CoordinatorHost {
    pub fn new(root: NodeHandle) -> Self {
        Self { root }
    }

    /// The current root of the tree. Changes if a [`crate::flow_orchestrator::FlowOrchestrator`]
    /// somewhere above is itself swapped out by a still-higher orchestrator;
    /// for the common case of one top-level `FlowOrchestrator`, this handle
    /// is stable for the process lifetime even as its internal subtree swaps.
    pub fn root(&self) -> NodeHandle {
        self.root.clone()
    }

    /// Replace the root entirely. Used only when the host app itself tears
    /// down and rebuilds the whole tree (e.g. in tests); ordinary flow swaps
    /// go through `FlowOrchestrator::transition_to_flow` instead.
    pub fn set_root(&mut self, root: NodeHandle) {
        self.root = root;
    }

    /// Navigate from the root of the tree. Equivalent to
    /// `host.root().borrow_mut().navigate(route, None)`.
    pub fn navigate(&self, route: &AnyRoute) -> bool {
        self.root.borrow_mut().navigate(route, None)
    }
}

impl Global for CoordinatorHost {}

/// Extension trait for reaching the hosted coordinator tree from `App`.
pub trait UseCoordinator {
    /// Reference to the hosted [`CoordinatorHost`].
    fn coordinator_host(&self) -> &CoordinatorHost;

    /// Mutable access to the hosted [`CoordinatorHost`].
    fn update_coordinator_host<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut CoordinatorHost, &mut App) -> R;

    /// Shorthand for navigating the hosted tree's root and refreshing every
    /// window so views observing the change re-render.
    fn navigate_coordinator(&mut self, route: AnyRoute) -> bool;
}

impl UseCoordinator for App {
    fn coordinator_host(&self) -> &CoordinatorHost {
        self.global::<CoordinatorHost>()
    }

    fn update_coordinator_host<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut CoordinatorHost, &mut App) -> R,
    {
        self.update_global(f)
    }

    fn navigate_coordinator(&mut self, route: AnyRoute) -> bool {
        let accepted = self.coordinator_host().root().borrow_mut().navigate(&route, None);
        self.refresh_windows();
        accepted
    }
}

/// Install `root` as the process-wide coordinator tree. Call once at app
/// startup, before any view reads [`UseCoordinator::coordinator_host`].
pub fn init_coordinator_host(cx: &mut App, root: NodeHandle) {
    cx.set_global(CoordinatorHost::new(root));
}
