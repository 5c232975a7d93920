//! Flow-orchestrator coordinator specialization (§4.7).
//!
//! A [`FlowOrchestrator<R, D>`] is a coordinator that owns exactly one
//! active child subtree (`current_flow`) and swaps it atomically via
//! [`FlowOrchestrator::transition_to_flow`] — the Login/MainApp pattern.
//! It composes a [`CoordinatorCore<R, D>`] rather than subclassing
//! [`crate::coordinator::Coordinator`]; its own `navigate`/`validate` reuse
//! `CoordinatorCore::navigate_impl` unchanged, since the spec does not
//! override the traversal itself here — only `addChild`/`removeChild`
//! gain the atomic `transition_to_flow` wrapper, and unhandled routes at
//! the root still resolve through `CoordinatorDelegate::handle_flow_change`
//! exactly as for a plain `Coordinator`.

use crate::coordinator::{
    CoordinatorCore, CoordinatorDelegate, CoordinatorNode, NodeHandle, PresentationContext,
    RouteHost, WeakNodeHandle,
};
use crate::route::{AnyRoute, Route};
use std::cell::RefCell;
use std::rc::Rc;

pub struct FlowOrchestrator<R: Route, D: CoordinatorDelegate<R>> {
    core: CoordinatorCore<R, D>,
    current_flow: Option<NodeHandle>,
}

impl<R: Route, D: CoordinatorDelegate<R>> FlowOrchestrator<R, D> {
    /// Returns the concrete `Rc<RefCell<Self>>` so the caller can still
    /// reach `transition_to_flow` on it; coerces to [`NodeHandle`] implicitly
    /// wherever one is expected.
    pub fn new_root(root: R, delegate: D, label: impl Into<String>) -> Rc<RefCell<Self>> {
        let label = label.into();
        Rc::new_cyclic(|weak| {
            let self_weak: WeakNodeHandle = weak.clone();
            RefCell::new(FlowOrchestrator {
                core: CoordinatorCore::new(root, delegate, self_weak, label),
                current_flow: None,
            })
        })
    }

    pub fn core(&self) -> &CoordinatorCore<R, D> {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut CoordinatorCore<R, D> {
        &mut self.core
    }

    pub fn current_flow(&self) -> Option<NodeHandle> {
        self.current_flow.clone()
    }

    /// Atomically swap the active child subtree (§4.7):
    /// 1. Detach the previous `current_flow`, if any.
    /// 2. Adopt `new_coord` as the new one.
    /// 3. Reset this coordinator's own router to `root_route`, dismissing
    ///    any modal/detour of its own.
    pub fn transition_to_flow(&mut self, new_coord: NodeHandle, root_route: R) {
        crate::info_log!(
            "{}: transition_to_flow {} -> {}",
            self.core.label(),
            new_coord.borrow().label(),
            root_route.identifier()
        );
        if let Some(previous) = self.current_flow.take() {
            self.core.remove_child(&previous);
        }
        self.core.add_child(new_coord.clone(), PresentationContext::Pushed);
        self.current_flow = Some(new_coord);
        self.transition_to_new_flow(root_route);
    }

    /// Reset this coordinator's own router to `root`, clearing overlays.
    /// Shared with the plain `Coordinator` wording in §4.7 step 3.
    pub fn transition_to_new_flow(&mut self, root: R) {
        crate::debug_log!("{}: transition_to_new_flow {}", self.core.label(), root.identifier());
        self.core.router_mut().set_root(root);
        self.core.dismiss_modal();
        self.core.dismiss_detour();
    }

    pub fn pop_to(&mut self, route: R) {
        self.core.router_mut().pop_to(&route);
    }

    pub fn pop_to_root(&mut self) {
        self.core.router_mut().pop_to_root();
    }

    pub fn present_detour(&mut self, child: NodeHandle, initial_route: AnyRoute) {
        self.core.present_detour(child, initial_route);
    }

    pub fn dismiss_detour(&mut self) {
        self.core.dismiss_detour();
    }
}

impl<R: Route, D: CoordinatorDelegate<R>> RouteHost<R> for FlowOrchestrator<R, D> {
    fn current_route(&self) -> R {
        self.core.router().current().clone()
    }
}

impl<R: Route, D: CoordinatorDelegate<R>> CoordinatorNode for FlowOrchestrator<R, D> {
    fn navigate(&mut self, route: &AnyRoute, caller: Option<WeakNodeHandle>) -> bool {
        if caller.is_none() && !self.core.navigate_impl(route.clone(), None, true) {
            return false;
        }
        self.core.navigate_impl(route.clone(), caller, false)
    }

    fn validate(&mut self, route: &AnyRoute, caller: Option<WeakNodeHandle>) -> bool {
        self.core.navigate_impl(route.clone(), caller, true)
    }

    fn can_navigate(&self, route: &AnyRoute) -> bool {
        self.core.can_navigate(route)
    }

    fn pop(&mut self) {
        self.core.pop();
    }

    fn weak_self(&self) -> WeakNodeHandle {
        self.core.self_weak()
    }

    fn parent(&self) -> Option<WeakNodeHandle> {
        self.core.parent()
    }

    fn set_parent(&mut self, parent: Option<WeakNodeHandle>) {
        self.core.set_parent(parent);
    }

    fn presentation_context(&self) -> PresentationContext {
        self.core.presentation_context()
    }

    fn set_presentation_context(&mut self, context: PresentationContext) {
        self.core.set_presentation_context(context);
    }

    fn dismiss_modal(&mut self) {
        self.core.dismiss_modal();
    }

    fn dismiss_detour(&mut self) {
        self.core.dismiss_detour();
    }

    fn pop_child_matching(&mut self, candidate: &WeakNodeHandle) -> bool {
        let is_match = self
            .core
            .router()
            .state()
            .pushed_children
            .last()
            .is_some_and(|last| std::rc::Weak::ptr_eq(last, candidate));
        if is_match {
            self.core.router_mut().pop_child();
        }
        is_match
    }

    fn label(&self) -> String {
        self.core.label()
    }

    fn current_route_identifier(&self) -> String {
        self.core.router().current().identifier()
    }

    fn root_identifier(&self) -> String {
        self.core.router().state().root.identifier()
    }

    fn root_as_any(&self) -> AnyRoute {
        AnyRoute::new(self.core.router().state().root.clone())
    }
}
