//! The coordinator tree and the universal `navigate` algorithm.
//!
//! A [`Coordinator<R, D>`] owns a [`Router<R>`][crate::state::Router], a
//! non-owning back-reference to its parent, and owning collections of
//! child/modal/detour coordinators. Every cross-coordinator reference is
//! typed as the object-safe [`CoordinatorNode`] trait so that coordinators
//! with different concrete route types can share one tree; a coordinator
//! recovers its own concrete route type `R` only at the boundary of its
//! own methods.
//!
//! [`CoordinatorCore`] holds the state and the one real algorithm
//! (`navigate_impl`) shared by [`Coordinator`], [`crate::tab_coordinator::TabCoordinator`],
//! and [`crate::flow_orchestrator::FlowOrchestrator`] — those two
//! specializations compose a `CoordinatorCore` rather than subclassing it.

use crate::error::{self, ErrorContext, FlowError, ViewSlot};
use crate::route::{AnyRoute, NavigationKind, Route};
use crate::state::{ChildRef, DetentConfig, Router};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// How a coordinator is presented within its parent. Drives back-button
/// visibility only — the engine does not otherwise distinguish contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationContext {
    Root,
    Tab,
    Pushed,
    Modal,
    Detour,
}

impl PresentationContext {
    /// `Pushed`, `Modal`, and `Detour` show a back button; `Root` and `Tab`
    /// do not.
    pub fn should_show_back_button(self) -> bool {
        matches!(self, PresentationContext::Pushed | PresentationContext::Modal | PresentationContext::Detour)
    }
}

/// An owning reference to a coordinator in the tree.
pub type NodeHandle = Rc<RefCell<dyn CoordinatorNode>>;
/// A non-owning reference to a coordinator in the tree; upgrade fails once
/// the pointee has been detached and dropped.
pub type WeakNodeHandle = Weak<RefCell<dyn CoordinatorNode>>;

fn weak_eq(a: &WeakNodeHandle, b: &WeakNodeHandle) -> bool {
    Weak::ptr_eq(a, b)
}

/// Host-supplied policy for one coordinator's route type. Analogous to
/// overriding methods on the spec's `Coordinator<R>` base class.
pub trait CoordinatorDelegate<R: Route> {
    /// Whether this coordinator can directly display `route`.
    fn can_handle(&self, route: &R) -> bool;

    /// How this coordinator would apply `route` if it handles it directly.
    fn navigation_type(&self, route: &R) -> NavigationKind;

    /// Deep-link construction: an ordered path of intermediate routes to
    /// push/replace before reaching `route`, used only when the stack is
    /// currently empty. `None` or an empty sequence means no path is built.
    fn navigation_path(&self, _route: &R) -> Option<Vec<AnyRoute>> {
        None
    }

    /// Detent sizing to apply when presenting `route` as a modal.
    fn modal_detent_configuration(&self, _route: &R) -> Option<DetentConfig> {
        None
    }

    /// Root-level predicate: can a flow swap absorb this unhandled route?
    /// Only consulted when this coordinator has no parent.
    fn can_handle_flow_change(&self, _route: &AnyRoute) -> bool {
        false
    }

    /// Perform the flow swap. Only called after `can_handle_flow_change`
    /// returned true during validation.
    fn handle_flow_change(&mut self, _route: &AnyRoute) -> bool {
        false
    }

    /// Optional tab label, consulted by `TabCoordinator`'s host for
    /// rendering; unrelated to navigation itself.
    fn tab_item(&self) -> Option<String> {
        None
    }
}

/// Narrow, non-object-safe accessor for view integration: the concrete
/// route currently displayed by one coordinator's own router. Implemented
/// by [`Coordinator`], [`crate::tab_coordinator::TabCoordinator`], and
/// [`crate::flow_orchestrator::FlowOrchestrator`] alike so
/// [`crate::widgets::CoordinatorOutlet`] can render any of them without
/// knowing which specialization it holds.
pub trait RouteHost<R: Route> {
    fn current_route(&self) -> R;
}

/// The object-safe face every coordinator in the tree presents to its
/// parent, children, modals, and detour. Concrete route types never cross
/// this boundary — only [`AnyRoute`] and identifying strings do.
pub trait CoordinatorNode {
    /// Execution-phase entry point. `caller` identifies the coordinator
    /// this call arrived from (`None` only at the externally invoked
    /// root of a `navigate` call, which triggers validation first).
    fn navigate(&mut self, route: &AnyRoute, caller: Option<WeakNodeHandle>) -> bool;

    /// Validation-phase entry point: pure, mirrors `navigate`'s control
    /// flow exactly, performs no mutation.
    fn validate(&mut self, route: &AnyRoute, caller: Option<WeakNodeHandle>) -> bool;

    /// Recursive predicate: can this coordinator, or any of its
    /// descendants, handle `route`?
    fn can_navigate(&self, route: &AnyRoute) -> bool;

    /// Context-aware pop (§4.5).
    fn pop(&mut self);

    fn weak_self(&self) -> WeakNodeHandle;
    fn parent(&self) -> Option<WeakNodeHandle>;
    fn set_parent(&mut self, parent: Option<WeakNodeHandle>);
    fn presentation_context(&self) -> PresentationContext;
    fn set_presentation_context(&mut self, context: PresentationContext);

    fn dismiss_modal(&mut self);
    fn dismiss_detour(&mut self);

    /// If `candidate` is this coordinator's last pushed child, pop it and
    /// return true; otherwise a no-op returning false.
    fn pop_child_matching(&mut self, candidate: &WeakNodeHandle) -> bool;

    /// Human-identifying label for error context (e.g. the coordinator's
    /// type name, set at construction).
    fn label(&self) -> String;
    /// Identifier of the route currently displayed by this coordinator's
    /// own router.
    fn current_route_identifier(&self) -> String;
    /// `root` identifier of this coordinator's own router, used to match
    /// modal coordinators by root route.
    fn root_identifier(&self) -> String;
    /// This coordinator's own root route, type-erased. Used when
    /// presenting a modal coordinator whose concrete route type is known,
    /// by construction, to match the presenter's.
    fn root_as_any(&self) -> AnyRoute;
}

/// Shared state and algorithm used by every coordinator variant.
pub struct CoordinatorCore<R: Route, D: CoordinatorDelegate<R>> {
    router: Router<R>,
    parent: Option<WeakNodeHandle>,
    presentation_context: PresentationContext,
    internal_children: Vec<NodeHandle>,
    modal_coordinators: Vec<NodeHandle>,
    current_modal_coordinator: Option<NodeHandle>,
    detour_coordinator: Option<NodeHandle>,
    delegate: D,
    self_weak: WeakNodeHandle,
    label: String,
}

impl<R: Route, D: CoordinatorDelegate<R>> CoordinatorCore<R, D> {
    pub fn new(root: R, delegate: D, self_weak: WeakNodeHandle, label: impl Into<String>) -> Self {
        Self {
            router: Router::new(root),
            parent: None,
            presentation_context: PresentationContext::Root,
            internal_children: Vec::new(),
            modal_coordinators: Vec::new(),
            current_modal_coordinator: None,
            detour_coordinator: None,
            delegate,
            self_weak,
            label: label.into(),
        }
    }

    pub fn router(&self) -> &Router<R> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router<R> {
        &mut self.router
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    pub fn parent(&self) -> Option<WeakNodeHandle> {
        self.parent.clone()
    }

    pub fn set_parent(&mut self, parent: Option<WeakNodeHandle>) {
        self.parent = parent;
    }

    pub fn presentation_context(&self) -> PresentationContext {
        self.presentation_context
    }

    pub fn set_presentation_context(&mut self, context: PresentationContext) {
        self.presentation_context = context;
    }

    pub fn internal_children(&self) -> &[NodeHandle] {
        &self.internal_children
    }

    pub fn current_modal_coordinator(&self) -> Option<NodeHandle> {
        self.current_modal_coordinator.clone()
    }

    pub fn detour_coordinator(&self) -> Option<NodeHandle> {
        self.detour_coordinator.clone()
    }

    /// This coordinator's own weak handle, used by specializations
    /// (e.g. [`crate::tab_coordinator::TabCoordinator`]) composing this
    /// core to identify themselves as `caller` when delegating.
    pub fn self_weak(&self) -> WeakNodeHandle {
        self.self_weak.clone()
    }

    /// Human-identifying label for error context, shared with
    /// specializations that need to build their own [`ErrorContext`]s
    /// (e.g. `InvalidTabIndex`).
    pub fn label(&self) -> String {
        self.label.clone()
    }

    fn error_context(&self, route_identifier: impl Into<String>, route_type: impl Into<String>) -> ErrorContext {
        ErrorContext::new(self.label.clone(), route_identifier, route_type)
    }

    fn error_context_any(&self, route: &AnyRoute) -> ErrorContext {
        self.error_context(route.identifier().to_string(), "AnyRoute")
    }

    /// Adopt `child` into `internal_children` with the given
    /// presentation context. Reports `CircularReference`/`DuplicateChild`
    /// and is a no-op rather than panicking on misuse, per §7.
    pub fn add_child(&mut self, child: NodeHandle, context: PresentationContext) {
        if weak_eq(&Rc::downgrade(&child), &self.self_weak) {
            error::report(&FlowError::CircularReference(self.error_context("", "")));
            return;
        }
        if self
            .internal_children
            .iter()
            .any(|existing| Rc::ptr_eq(existing, &child))
        {
            error::report(&FlowError::DuplicateChild(self.error_context("", "")));
            return;
        }
        child.borrow_mut().set_parent(Some(self.self_weak.clone()));
        child.borrow_mut().set_presentation_context(context);
        self.internal_children.push(child);
    }

    pub fn remove_child(&mut self, child: &NodeHandle) {
        self.internal_children.retain(|existing| !Rc::ptr_eq(existing, child));
        if let Some(current) = &self.current_modal_coordinator {
            if Rc::ptr_eq(current, child) {
                self.current_modal_coordinator = None;
            }
        }
        if let Some(detour) = &self.detour_coordinator {
            if Rc::ptr_eq(detour, child) {
                self.detour_coordinator = None;
            }
        }
        child.borrow_mut().set_parent(None);
    }

    /// Register `child` as a candidate modal coordinator. Unlike
    /// `add_child`, this does not place it in `internal_children`.
    pub fn add_modal_coordinator(&mut self, child: NodeHandle) {
        if weak_eq(&Rc::downgrade(&child), &self.self_weak) {
            error::report(&FlowError::CircularReference(self.error_context("", "")));
            return;
        }
        self.modal_coordinators.push(child);
    }

    pub fn remove_modal_coordinator(&mut self, child: &NodeHandle) {
        self.modal_coordinators.retain(|existing| !Rc::ptr_eq(existing, child));
    }

    /// Entered only explicitly, never via `navigate`.
    pub fn present_detour(&mut self, child: NodeHandle, initial_route: AnyRoute) {
        child.borrow_mut().set_parent(Some(self.self_weak.clone()));
        child.borrow_mut().set_presentation_context(PresentationContext::Detour);
        self.detour_coordinator = Some(child);
        self.router.present_detour(initial_route);
    }

    pub fn dismiss_detour(&mut self) {
        if let Some(detour) = self.detour_coordinator.take() {
            crate::debug_log!("{}: dismiss_detour ({})", self.label, detour.borrow().label());
            detour.borrow_mut().set_parent(None);
        }
        self.router.dismiss_detour();
    }

    pub fn dismiss_modal(&mut self) {
        if let Some(modal) = self.current_modal_coordinator.take() {
            crate::debug_log!("{}: dismiss_modal ({})", self.label, modal.borrow().label());
            modal.borrow_mut().set_parent(None);
        }
        self.router.dismiss_modal();
    }

    /// Context-aware pop (§4.5).
    pub fn pop(&mut self) {
        crate::trace_log!("{}: pop", self.label);
        if let Some(last) = self.router.state().pushed_children.last().cloned() {
            if let Some(child) = last.upgrade() {
                let has_more_than_root = {
                    let borrowed = child.borrow();
                    borrowed.current_route_identifier() != borrowed.root_identifier()
                };
                if has_more_than_root {
                    child.borrow_mut().pop();
                    return;
                }
            }
            self.router.pop_child();
            return;
        }
        if self.router.state().stack.is_empty() {
            match self.presentation_context {
                PresentationContext::Modal => {
                    crate::debug_log!("{}: pop delegates to parent.dismiss_modal (empty stack, Modal context)", self.label);
                    if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
                        parent.borrow_mut().dismiss_modal();
                    }
                    return;
                }
                PresentationContext::Detour => {
                    crate::debug_log!("{}: pop delegates to parent.dismiss_detour (empty stack, Detour context)", self.label);
                    if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
                        parent.borrow_mut().dismiss_detour();
                    }
                    return;
                }
                _ => {}
            }
        }
        self.router.pop();
    }

    fn caller_is_internal(&self, caller: &Option<WeakNodeHandle>) -> bool {
        let Some(caller) = caller else { return false };
        self.internal_children
            .iter()
            .any(|child| weak_eq(&Rc::downgrade(child), caller))
            || self
                .current_modal_coordinator
                .as_ref()
                .is_some_and(|modal| weak_eq(&Rc::downgrade(modal), caller))
            || self
                .detour_coordinator
                .as_ref()
                .is_some_and(|detour| weak_eq(&Rc::downgrade(detour), caller))
    }

    fn caller_is_current_modal(&self, caller: &Option<WeakNodeHandle>) -> bool {
        let Some(caller) = caller else { return false };
        self.current_modal_coordinator
            .as_ref()
            .is_some_and(|modal| weak_eq(&Rc::downgrade(modal), caller))
    }

    fn caller_is_detour(&self, caller: &Option<WeakNodeHandle>) -> bool {
        let Some(caller) = caller else { return false };
        self.detour_coordinator
            .as_ref()
            .is_some_and(|detour| weak_eq(&Rc::downgrade(detour), caller))
    }

    fn caller_is_pushed_child(&self, caller: &Option<WeakNodeHandle>) -> bool {
        let Some(caller) = caller else { return false };
        self.router.state().pushed_children.iter().any(|child| weak_eq(child, caller))
    }

    fn find_modal_for_route(&self, route: &R) -> Option<NodeHandle> {
        let identifier = route.identifier();
        if let Some(current) = &self.current_modal_coordinator {
            if current.borrow().root_identifier() == identifier {
                return Some(current.clone());
            }
        }
        self.modal_coordinators
            .iter()
            .find(|candidate| candidate.borrow().root_identifier() == identifier)
            .cloned()
    }

    /// `true` iff any of detour, modal, non-empty stack, or non-empty
    /// pushed-children is set.
    pub fn should_clean_state_for_bubbling(&self) -> bool {
        let state = self.router.state();
        state.detour.is_some()
            || state.presented.is_some()
            || !state.stack.is_empty()
            || !state.pushed_children.is_empty()
    }

    pub fn clean_state_for_bubbling(&mut self) {
        self.dismiss_detour();
        self.dismiss_modal();
        self.router.pop_to_root();
        while !self.router.state().pushed_children.is_empty() {
            self.router.pop_child();
        }
    }

    /// Deep-link construction (§4.3). Only applies when `router.stack` is
    /// empty and `delegate.navigation_path(target)` returns a non-empty
    /// sequence. Returns `None` if no path applies and the caller should
    /// proceed to execute `target`'s own kind normally; `Some(true)` if a
    /// path was built and `target` itself was among its elements (nothing
    /// left to do); `Some(false)` if the path is invalid — an
    /// intermediate `Modal`/`TabSwitch` element, or an element that
    /// doesn't downcast to this coordinator's own route type — which this
    /// crate treats as a validation-time failure per the Open Question
    /// resolution recorded in DESIGN.md.
    fn try_build_navigation_path(&mut self, target: &R, dry_run: bool) -> Option<bool> {
        if !self.router.state().stack.is_empty() {
            return None;
        }
        let path = self.delegate.navigation_path(target)?;
        if path.is_empty() {
            return None;
        }

        let root_identifier = self.router.state().root.identifier();
        let mut destination_in_path = false;
        let mut built: Vec<(R, NavigationKind)> = Vec::with_capacity(path.len());
        for element in &path {
            if element.identifier() == root_identifier {
                continue;
            }
            let Some(concrete) = element.downcast::<R>() else {
                error::report(&FlowError::ConfigurationError(
                    self.error_context(element.identifier(), std::any::type_name::<R>()),
                    "navigation path element has a different route type than its coordinator".into(),
                ));
                return Some(false);
            };
            match self.delegate.navigation_type(&concrete) {
                kind @ (NavigationKind::Push | NavigationKind::Replace) => {
                    if &concrete == target {
                        destination_in_path = true;
                    }
                    built.push((concrete, kind));
                }
                NavigationKind::Modal | NavigationKind::TabSwitch(_) => {
                    error::report(&FlowError::ConfigurationError(
                        self.error_context(element.identifier(), std::any::type_name::<R>()),
                        "navigation path cannot contain an intermediate Modal or TabSwitch element".into(),
                    ));
                    return Some(false);
                }
            }
        }

        if !dry_run {
            for (element, kind) in built {
                match kind {
                    NavigationKind::Push => self.router.push(element),
                    NavigationKind::Replace => self.router.replace(element),
                    NavigationKind::Modal | NavigationKind::TabSwitch(_) => unreachable!("filtered above"),
                }
            }
        }
        Some(destination_in_path)
    }

    /// The shared, dry-run-parameterized traversal. `dry_run: true` is
    /// validation (§4.2 phase 1); `dry_run: false` is execution (phase 2).
    /// Both phases run exactly the same control flow; only the mutation
    /// sites differ.
    ///
    /// Steps 1-3 (smart navigation, modal/detour delegation, direct
    /// handling) and step 4 (child/modal-candidate delegation) are
    /// factored into [`Self::handle_locally`] and
    /// [`Self::delegate_to_children`] so that
    /// [`crate::tab_coordinator::TabCoordinator`] can fall back into this
    /// same bubbling step after its own tab-selection logic instead of
    /// duplicating it.
    pub fn navigate_impl(&mut self, route: AnyRoute, caller: Option<WeakNodeHandle>, dry_run: bool) -> bool {
        crate::debug_log!(
            "{}: {} {}",
            self.label,
            if dry_run { "validate" } else { "navigate" },
            route.identifier()
        );
        if let Some(result) = self.handle_locally(&route, &caller, dry_run) {
            return result;
        }
        if let Some(result) = self.delegate_to_children(&route, &caller, dry_run) {
            return result;
        }
        self.bubble_to_parent(&route, &caller, dry_run)
    }

    /// Steps 1-3: smart navigation, modal/detour delegation, direct
    /// handling. Returns `Some(result)` if one of these applied; `None`
    /// means fall through to child delegation.
    fn handle_locally(&mut self, route: &AnyRoute, caller: &Option<WeakNodeHandle>, dry_run: bool) -> Option<bool> {
        let concrete = route.downcast::<R>();

        // Step 1 — smart navigation.
        if let Some(target) = &concrete {
            let already_current = self.router.current() == target;
            let in_stack = self.router.state().stack.contains(target);
            let is_root = &self.router.state().root == target;
            if already_current || in_stack || is_root {
                crate::trace_log!("{}: smart navigation handles {}", self.label, target.identifier());
                if !dry_run {
                    if in_stack {
                        self.router.pop_to(target);
                    } else if is_root {
                        self.router.pop_to_root();
                    }
                    if self.caller_is_pushed_child(caller) {
                        self.router.pop_child();
                    } else if self.caller_is_current_modal(caller) {
                        self.dismiss_modal();
                    } else if self.caller_is_detour(caller) {
                        self.dismiss_detour();
                    } else if self.presentation_context == PresentationContext::Pushed {
                        if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
                            parent.borrow_mut().pop_child_matching(&self.self_weak);
                        }
                    }
                }
                return Some(true);
            }
        }

        // Step 2 — modal/detour delegation, unless caller is ours.
        if !self.caller_is_internal(caller) {
            if let Some(modal) = self.current_modal_coordinator.clone() {
                let handled = if dry_run {
                    modal.borrow_mut().validate(route, Some(self.self_weak.clone()))
                } else {
                    modal.borrow_mut().navigate(route, Some(self.self_weak.clone()))
                };
                if handled {
                    return Some(true);
                }
                if !dry_run {
                    self.dismiss_modal();
                }
            }
            if let Some(detour) = self.detour_coordinator.clone() {
                let handled = if dry_run {
                    detour.borrow_mut().validate(route, Some(self.self_weak.clone()))
                } else {
                    detour.borrow_mut().navigate(route, Some(self.self_weak.clone()))
                };
                if handled {
                    return Some(true);
                }
                if !dry_run {
                    self.dismiss_detour();
                }
            }
        }

        // Step 3 — direct handling.
        if let Some(target) = &concrete {
            if self.delegate.can_handle(target) {
                crate::trace_log!("{}: handles {} directly", self.label, target.identifier());
                match self.delegate.navigation_type(target) {
                    NavigationKind::Push | NavigationKind::Replace => {
                        if let Some(path_result) = self.try_build_navigation_path(target, dry_run) {
                            return Some(path_result);
                        }
                        if !dry_run {
                            match self.delegate.navigation_type(target) {
                                NavigationKind::Push => self.router.push(target.clone()),
                                NavigationKind::Replace => self.router.replace(target.clone()),
                                _ => unreachable!("matched above"),
                            }
                        }
                        return Some(true);
                    }
                    NavigationKind::TabSwitch(index) => {
                        if !dry_run {
                            self.router.select_tab(index);
                        }
                        return Some(true);
                    }
                    NavigationKind::Modal => match self.find_modal_for_route(target) {
                        Some(modal) => {
                            if !dry_run {
                                let already_showing = self
                                    .current_modal_coordinator
                                    .as_ref()
                                    .is_some_and(|current| Rc::ptr_eq(current, &modal));
                                if !already_showing {
                                    let detents = self.delegate.modal_detent_configuration(target);
                                    self.router.present(target.clone(), detents);
                                    modal.borrow_mut().set_parent(Some(self.self_weak.clone()));
                                    modal.borrow_mut().set_presentation_context(PresentationContext::Modal);
                                    self.current_modal_coordinator = Some(modal.clone());
                                }
                                modal.borrow_mut().navigate(route, Some(self.self_weak.clone()));
                            }
                            return Some(true);
                        }
                        None => {
                            // Reported unconditionally: this is a terminal failure
                            // for this node (no further delegation/bubbling follows
                            // it, per §4.2 step 3), so a failing validation pass
                            // never gets a follow-up execution pass to report from.
                            error::report(&FlowError::ModalCoordinatorNotConfigured(
                                self.error_context(target.identifier(), std::any::type_name::<R>()),
                            ));
                            return Some(false);
                        }
                    },
                }
            }
        }

        None
    }

    /// Step 4: delegate to internal children, then modal-only candidates
    /// that can reach the route but aren't presented yet. Returns
    /// `Some(result)` if a child or modal candidate handled it; `None`
    /// means fall through to bubbling.
    fn delegate_to_children(&mut self, route: &AnyRoute, caller: &Option<WeakNodeHandle>, dry_run: bool) -> Option<bool> {
        for child in self.internal_children.clone() {
            let is_caller = caller.as_ref().is_some_and(|c| weak_eq(&Rc::downgrade(&child), c));
            if is_caller {
                continue;
            }
            let can_navigate = child.borrow().can_navigate(route);
            if !can_navigate {
                continue;
            }
            if dry_run {
                if child.borrow_mut().validate(route, Some(self.self_weak.clone())) {
                    return Some(true);
                }
                continue;
            }
            let already_pushed = self
                .router
                .state()
                .pushed_children
                .iter()
                .any(|existing| existing.upgrade().is_some_and(|c| Rc::ptr_eq(&c, &child)));
            if already_pushed {
                if child.borrow_mut().navigate(route, Some(self.self_weak.clone())) {
                    return Some(true);
                }
                continue;
            }
            crate::debug_log!("{}: pushing child {} for {}", self.label, child.borrow().label(), route.identifier());
            child.borrow_mut().set_parent(Some(self.self_weak.clone()));
            child.borrow_mut().set_presentation_context(PresentationContext::Pushed);
            self.router.push_child(Rc::downgrade(&child));
            if child.borrow_mut().navigate(route, Some(self.self_weak.clone())) {
                return Some(true);
            }
        }
        for modal in self.modal_coordinators.clone() {
            let is_caller = caller.as_ref().is_some_and(|c| weak_eq(&Rc::downgrade(&modal), c));
            if is_caller {
                continue;
            }
            if !modal.borrow().can_navigate(route) {
                continue;
            }
            if dry_run {
                return Some(true);
            }
            crate::debug_log!("{}: presenting modal candidate {} for {}", self.label, modal.borrow().label(), route.identifier());
            // Modal shares route type R with its parent by construction
            // (enforced in `add_modal_coordinator`'s generic bound), so
            // this downcast always succeeds in practice.
            if let Some(modal_root) = modal.borrow().root_as_any().downcast::<R>() {
                if self.try_build_navigation_path(&modal_root, dry_run) == Some(false) {
                    return Some(false);
                }
                let detents = self.delegate.modal_detent_configuration(&modal_root);
                self.router.present(modal_root, detents);
            }
            modal.borrow_mut().set_parent(Some(self.self_weak.clone()));
            modal.borrow_mut().set_presentation_context(PresentationContext::Modal);
            self.current_modal_coordinator = Some(modal.clone());
            modal.borrow_mut().navigate(route, Some(self.self_weak.clone()));
            return Some(true);
        }
        None
    }

    /// Steps 5/6: bubble to parent, or resolve at the root via a flow
    /// change. Always terminal — returns the final `bool` result.
    fn bubble_to_parent(&mut self, route: &AnyRoute, caller: &Option<WeakNodeHandle>, dry_run: bool) -> bool {
        self.bubble_to_parent_with(route, caller, dry_run, Self::clean_state_for_bubbling)
    }

    /// Same as [`Self::bubble_to_parent`] but with the pre-bubble cleanup
    /// step supplied by the caller, so specializations (e.g.
    /// [`crate::tab_coordinator::TabCoordinator`]) can swap in a cleanup
    /// that preserves state the base coordinator would discard.
    fn bubble_to_parent_with(
        &mut self,
        route: &AnyRoute,
        caller: &Option<WeakNodeHandle>,
        dry_run: bool,
        clean: impl FnOnce(&mut Self),
    ) -> bool {
        match self.parent.as_ref().and_then(Weak::upgrade) {
            None => {
                if self.delegate.can_handle_flow_change(route) {
                    crate::info_log!("{}: absorbing {} as a flow change at the tree root", self.label, route.identifier());
                    if dry_run {
                        true
                    } else {
                        self.delegate.handle_flow_change(route)
                    }
                } else {
                    // Reported unconditionally, same reasoning as the
                    // `ModalCoordinatorNotConfigured` branch above: a failing
                    // validation pass at the root is the final verdict and is
                    // never followed by an execution pass to report from.
                    error::report(&FlowError::NavigationFailed(self.error_context_any(route)));
                    false
                }
            }
            Some(parent) => {
                let _ = caller;
                if dry_run {
                    parent.borrow_mut().validate(route, Some(self.self_weak.clone()))
                } else {
                    crate::trace_log!("{}: bubbling {} to parent", self.label, route.identifier());
                    if self.should_clean_state_for_bubbling() {
                        clean(self);
                    }
                    parent.borrow_mut().navigate(route, Some(self.self_weak.clone()))
                }
            }
        }
    }

    /// Like [`Self::navigate_impl`] but bubbling cleans up with `clean`
    /// instead of the base [`Self::clean_state_for_bubbling`]. Used by
    /// specializations that override what "clean" means while reusing
    /// direct-handling and child-delegation unchanged.
    pub(crate) fn navigate_impl_with_clean(
        &mut self,
        route: AnyRoute,
        caller: Option<WeakNodeHandle>,
        dry_run: bool,
        clean: impl FnOnce(&mut Self),
    ) -> bool {
        if let Some(result) = self.handle_locally(&route, &caller, dry_run) {
            return result;
        }
        if let Some(result) = self.delegate_to_children(&route, &caller, dry_run) {
            return result;
        }
        self.bubble_to_parent_with(&route, &caller, dry_run, clean)
    }

    pub fn can_navigate(&self, route: &AnyRoute) -> bool {
        if let Some(target) = route.downcast::<R>() {
            if self.delegate.can_handle(&target) {
                return true;
            }
        }
        self.internal_children.iter().any(|child| child.borrow().can_navigate(route))
            || self.modal_coordinators.iter().any(|modal| modal.borrow().can_navigate(route))
    }
}

/// Base coordinator: a `CoordinatorCore<R, D>` with no further
/// specialization of `navigate_impl` or `clean_state_for_bubbling`.
pub struct Coordinator<R: Route, D: CoordinatorDelegate<R>> {
    core: CoordinatorCore<R, D>,
}

impl<R: Route, D: CoordinatorDelegate<R>> Coordinator<R, D> {
    /// Construct a standalone root coordinator (`PresentationContext::Root`).
    ///
    /// Returns the concrete `Rc<RefCell<Self>>` rather than the erased
    /// [`NodeHandle`] so the caller can still reach inherent methods like
    /// `add_child`/`add_modal_coordinator` on it; it coerces to `NodeHandle`
    /// implicitly at any call site that expects one (e.g. a parent's own
    /// `add_child`).
    pub fn new_root(root: R, delegate: D, label: impl Into<String>) -> Rc<RefCell<Self>> {
        let label = label.into();
        Rc::new_cyclic(|weak| {
            let self_weak: WeakNodeHandle = weak.clone();
            RefCell::new(Coordinator {
                core: CoordinatorCore::new(root, delegate, self_weak, label),
            })
        })
    }

    pub fn core(&self) -> &CoordinatorCore<R, D> {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut CoordinatorCore<R, D> {
        &mut self.core
    }

    pub fn add_child(&mut self, child: NodeHandle) {
        self.core.add_child(child, PresentationContext::Pushed);
    }

    pub fn remove_child(&mut self, child: &NodeHandle) {
        self.core.remove_child(child);
    }

    pub fn add_modal_coordinator(&mut self, child: NodeHandle) {
        self.core.add_modal_coordinator(child);
    }

    pub fn remove_modal_coordinator(&mut self, child: &NodeHandle) {
        self.core.remove_modal_coordinator(child);
    }

    pub fn present_detour(&mut self, child: NodeHandle, initial_route: AnyRoute) {
        self.core.present_detour(child, initial_route);
    }

    pub fn dismiss_detour(&mut self) {
        self.core.dismiss_detour();
    }

    pub fn pop_to(&mut self, route: R) {
        self.core.router_mut().pop_to(&route);
    }

    pub fn pop_to_root(&mut self) {
        self.core.router_mut().pop_to_root();
    }

    /// Replace this coordinator's root, clearing overlays — used by
    /// `FlowOrchestrator::transition_to_flow`.
    pub fn transition_to_new_flow(&mut self, root: R) {
        self.core.router_mut().set_root(root);
        self.core.dismiss_modal();
        self.core.dismiss_detour();
    }
}

impl<R: Route, D: CoordinatorDelegate<R>> RouteHost<R> for Coordinator<R, D> {
    fn current_route(&self) -> R {
        self.core.router().current().clone()
    }
}

impl<R: Route, D: CoordinatorDelegate<R>> CoordinatorNode for Coordinator<R, D> {
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
        self.core.self_weak.clone()
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
            .is_some_and(|last| weak_eq(last, candidate));
        if is_match {
            self.core.router_mut().pop_child();
        }
        is_match
    }

    fn label(&self) -> String {
        self.core.label.clone()
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
