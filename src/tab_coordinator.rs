//! Tab-aware coordinator specialization (§4.6).
//!
//! A [`TabCoordinator<R, D>`] holds one child per tab. It composes a
//! [`CoordinatorCore<R, D>`] rather than subclassing [`crate::coordinator::Coordinator`]
//! — Rust has no subclassing, and the spec's own design notes call for
//! "additional traits with default algorithms" layered over shared core
//! state, which this realizes via composition plus an overridden
//! `navigate_impl`/`clean_state_for_bubbling` pair.

use crate::coordinator::{
    CoordinatorCore, CoordinatorDelegate, CoordinatorNode, NodeHandle, PresentationContext,
    RouteHost, WeakNodeHandle,
};
use crate::error::{self, ErrorContext, FlowError};
use crate::route::{AnyRoute, Route};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub struct TabCoordinator<R: Route, D: CoordinatorDelegate<R>> {
    core: CoordinatorCore<R, D>,
}

impl<R: Route, D: CoordinatorDelegate<R>> TabCoordinator<R, D> {
    /// Returns the concrete `Rc<RefCell<Self>>` so the caller can still
    /// reach `add_tab`/`switch_to_tab` on it; coerces to [`NodeHandle`]
    /// implicitly wherever one is expected.
    pub fn new_root(root: R, delegate: D, label: impl Into<String>) -> Rc<RefCell<Self>> {
        let label = label.into();
        Rc::new_cyclic(|weak| {
            let self_weak: WeakNodeHandle = weak.clone();
            RefCell::new(TabCoordinator {
                core: CoordinatorCore::new(root, delegate, self_weak, label),
            })
        })
    }

    pub fn core(&self) -> &CoordinatorCore<R, D> {
        &self.core
    }

    /// New children default to `Tab` presentation context, one per tab,
    /// in the order added.
    pub fn add_tab(&mut self, child: NodeHandle) {
        self.core.add_child(child, PresentationContext::Tab);
    }

    /// `i` out of `0..children.count` reports `InvalidTabIndex` and
    /// leaves state unchanged.
    pub fn switch_to_tab(&mut self, index: u32) {
        let count = self.core.internal_children().len() as u32;
        if index >= count {
            error::report(&FlowError::InvalidTabIndex {
                context: ErrorContext::new(self.core.label(), "", std::any::type_name::<R>()),
                index,
                valid_range: 0..count,
            });
            return;
        }
        crate::debug_log!("{}: switch_to_tab {}", self.core.label(), index);
        self.core.router_mut().select_tab(index);
    }

    fn selected_tab_child(&self) -> Option<NodeHandle> {
        let selected = self.core.router().state().selected_tab as usize;
        self.core.internal_children().get(selected).cloned()
    }
}

impl<R: Route, D: CoordinatorDelegate<R>> RouteHost<R> for TabCoordinator<R, D> {
    fn current_route(&self) -> R {
        self.core.router().current().clone()
    }
}

impl<R: Route, D: CoordinatorDelegate<R>> CoordinatorNode for TabCoordinator<R, D> {
    fn navigate(&mut self, route: &AnyRoute, caller: Option<WeakNodeHandle>) -> bool {
        if caller.is_none() && !self.validate(route, None) {
            return false;
        }
        self.navigate_execute(route, caller)
    }

    fn validate(&mut self, route: &AnyRoute, caller: Option<WeakNodeHandle>) -> bool {
        self.navigate_tab_aware(route, caller, true)
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
            .is_some_and(|last| Weak::ptr_eq(last, candidate));
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

impl<R: Route, D: CoordinatorDelegate<R>> TabCoordinator<R, D> {
    /// Tab-aware navigate (§4.6):
    /// 1. Direct handling as usual.
    /// 2. Try the currently selected tab.
    /// 3. Scan remaining tabs; switch to the first that can navigate.
    /// 4. Else bubble to parent (via `CoordinatorCore::navigate_impl`'s
    ///    own bubbling step, reused unchanged).
    fn navigate_tab_aware(&mut self, route: &AnyRoute, caller: Option<WeakNodeHandle>, dry_run: bool) -> bool {
        if let Some(concrete) = route.downcast::<R>() {
            if self.core.delegate().can_handle(&concrete) {
                return self.core.navigate_impl(route.clone(), caller, dry_run);
            }
        }

        if let Some(selected) = self.selected_tab_child() {
            let is_caller = caller.as_ref().is_some_and(|c| Weak::ptr_eq(&Rc::downgrade(&selected), c));
            if !is_caller && selected.borrow().can_navigate(route) {
                crate::trace_log!("{}: delegating {} to selected tab {}", self.core.label(), route.identifier(), selected.borrow().label());
                return if dry_run {
                    selected.borrow_mut().validate(route, Some(self.core.self_weak()))
                } else {
                    selected.borrow_mut().navigate(route, Some(self.core.self_weak()))
                };
            }
        }

        let selected_index = self.core.router().state().selected_tab as usize;
        let children: Vec<NodeHandle> = self.core.internal_children().to_vec();
        for (index, child) in children.iter().enumerate() {
            if index == selected_index {
                continue;
            }
            let is_caller = caller.as_ref().is_some_and(|c| Weak::ptr_eq(&Rc::downgrade(child), c));
            if is_caller || !child.borrow().can_navigate(route) {
                continue;
            }
            if dry_run {
                return true;
            }
            crate::debug_log!("{}: switching to tab {} to reach {}", self.core.label(), index, route.identifier());
            self.core.router_mut().select_tab(index as u32);
            return child.borrow_mut().navigate(route, Some(self.core.self_weak()));
        }

        // Bubble to parent: reuse the core's direct-handling/child-delegation
        // steps (harmless re-checks, since we've just established neither
        // applies) but with tab-preserving cleanup instead of the base
        // coordinator's full `clean_state_for_bubbling` — a sibling route
        // bubbling through must not clear other tabs' stacks.
        self.core.navigate_impl_with_clean(
            route.clone(),
            caller,
            dry_run,
            CoordinatorCore::clean_state_for_bubbling_tab_preserving,
        )
    }

    fn navigate_execute(&mut self, route: &AnyRoute, caller: Option<WeakNodeHandle>) -> bool {
        self.navigate_tab_aware(route, caller, false)
    }
}

impl<R: Route, D: CoordinatorDelegate<R>> CoordinatorCore<R, D> {
    /// Dismisses only the modal — tabs preserve their own stacks when a
    /// sibling route bubbles through, unlike the base coordinator's full
    /// `clean_state_for_bubbling`.
    pub(crate) fn clean_state_for_bubbling_tab_preserving(&mut self) {
        self.dismiss_modal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{Coordinator, NavigationKind};

    #[derive(Debug, Clone, PartialEq)]
    enum TabRoute {
        Home,
        Settings,
    }

    impl Route for TabRoute {
        fn identifier(&self) -> String {
            match self {
                TabRoute::Home => "home".into(),
                TabRoute::Settings => "settings".into(),
            }
        }
    }

    struct NeverHandle;
    impl CoordinatorDelegate<TabRoute> for NeverHandle {
        fn can_handle(&self, _route: &TabRoute) -> bool {
            false
        }
        fn navigation_type(&self, _route: &TabRoute) -> NavigationKind {
            NavigationKind::Push
        }
    }

    fn tab_coordinator_with_two_tabs() -> Rc<RefCell<TabCoordinator<TabRoute, NeverHandle>>> {
        let tabs = TabCoordinator::new_root(TabRoute::Home, NeverHandle, "Tabs");
        let first: NodeHandle = Coordinator::new_root(TabRoute::Home, NeverHandle, "Tab0");
        let second: NodeHandle = Coordinator::new_root(TabRoute::Settings, NeverHandle, "Tab1");
        tabs.borrow_mut().add_tab(first);
        tabs.borrow_mut().add_tab(second);
        tabs
    }

    #[test]
    fn switch_to_tab_in_range_updates_selected_tab() {
        let tabs = tab_coordinator_with_two_tabs();
        tabs.borrow_mut().switch_to_tab(1);
        assert_eq!(tabs.borrow().core().router().state().selected_tab, 1);
    }

    #[test]
    fn switch_to_tab_out_of_range_reports_invalid_index_and_leaves_state_unchanged() {
        let tabs = tab_coordinator_with_two_tabs();
        tabs.borrow_mut().switch_to_tab(5);
        assert_eq!(tabs.borrow().core().router().state().selected_tab, 0);
    }
}
