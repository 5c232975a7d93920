//! Per-coordinator router state.
//!
//! [`NavigationState`] is the immutable-snapshot value a router wraps;
//! [`Router`] owns exactly one `NavigationState<R>`, exposes the mutation
//! primitives of §4.1, and notifies subscribers after every accepted
//! mutation. Every mutation here is total: invalid preconditions (e.g.
//! `pop_to` with an unknown route) are silently ignored rather than
//! returning an error, matching the router's "no errors" failure semantics.

use crate::route::{AnyRoute, Route};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::rc::Weak;

/// Opaque UI sizing data for a presented modal, passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetentConfig {
    pub ideal_height: Option<f32>,
    pub min_height: Option<f32>,
    pub selected_detent: Option<String>,
}

/// A weak reference to a child coordinator flattened into this router's
/// stack. Not an owning reference — the owning entry lives in the parent
/// coordinator's `internalChildren`.
pub type ChildRef = Weak<RefCell<dyn crate::coordinator::CoordinatorNode>>;

/// Per-router immutable-in-spirit snapshot: root, pushed stack, tab index,
/// modal presentation, detour, pushed-child references, modal detent
/// configuration.
pub struct NavigationState<R: Route> {
    pub root: R,
    pub stack: Vec<R>,
    pub selected_tab: u32,
    pub presented: Option<R>,
    pub detour: Option<AnyRoute>,
    pub pushed_children: Vec<ChildRef>,
    pub modal_detent_configuration: Option<DetentConfig>,
}

impl<R: Route> NavigationState<R> {
    fn new(root: R) -> Self {
        Self {
            root,
            stack: Vec::new(),
            selected_tab: 0,
            presented: None,
            detour: None,
            pushed_children: Vec::new(),
            modal_detent_configuration: None,
        }
    }

    /// The current route displayed by this router: the top of `stack`, or
    /// `root` if the stack is empty.
    pub fn current(&self) -> &R {
        self.stack.last().unwrap_or(&self.root)
    }
}

/// Snapshot of one router's routes, erased to [`AnyRoute`], delivered to
/// subscribers after a change. Allows a parent to re-flatten a child's
/// state without knowing the child's concrete route type.
#[derive(Debug, Clone)]
pub struct RouteSnapshot {
    pub root: AnyRoute,
    pub stack: Vec<AnyRoute>,
}

/// Identifier returned by [`Router::subscribe`], used to cancel the
/// subscription via [`Router::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&RouteSnapshot)>;

/// Owns one [`NavigationState<R>`]; the only way its fields are mutated.
pub struct Router<R: Route> {
    state: NavigationState<R>,
    observers: HashMap<u64, Observer>,
    next_subscription_id: AtomicU64,
}

impl<R: Route> Router<R> {
    pub fn new(root: R) -> Self {
        Self {
            state: NavigationState::new(root),
            observers: HashMap::new(),
            next_subscription_id: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &NavigationState<R> {
        &self.state
    }

    pub fn current(&self) -> &R {
        self.state.current()
    }

    /// Append to `stack`.
    pub fn push(&mut self, r: R) {
        crate::trace_log!("router: push {}", r.identifier());
        self.state.stack.push(r);
        self.notify();
    }

    /// Drop the last of `stack`; no-op if empty.
    pub fn pop(&mut self) {
        if self.state.stack.pop().is_some() {
            crate::trace_log!("router: pop (depth now {})", self.state.stack.len());
            self.notify();
        }
    }

    /// Clear `stack`.
    pub fn pop_to_root(&mut self) {
        if !self.state.stack.is_empty() {
            crate::trace_log!("router: pop_to_root ({} routes dropped)", self.state.stack.len());
            self.state.stack.clear();
            self.notify();
        }
    }

    /// If `r` appears in `stack`, truncate to just after it; else no-op.
    pub fn pop_to(&mut self, r: &R) {
        if let Some(index) = self.state.stack.iter().position(|existing| existing == r) {
            crate::trace_log!("router: pop_to {} (truncate at {})", r.identifier(), index + 1);
            self.state.stack.truncate(index + 1);
            self.notify();
        }
    }

    /// Pop last then push `r`, so the replaced route is unreachable via
    /// back navigation.
    pub fn replace(&mut self, r: R) {
        crate::trace_log!("router: replace with {}", r.identifier());
        self.state.stack.pop();
        self.state.stack.push(r);
        self.notify();
    }

    pub fn select_tab(&mut self, index: u32) {
        crate::debug_log!("router: select_tab {}", index);
        self.state.selected_tab = index;
        self.notify();
    }

    pub fn present(&mut self, r: R, detents: Option<DetentConfig>) {
        crate::debug_log!("router: present {}", r.identifier());
        self.state.presented = Some(r);
        self.state.modal_detent_configuration = detents;
        self.notify();
    }

    pub fn dismiss_modal(&mut self) {
        if self.state.presented.is_some() {
            crate::debug_log!("router: dismiss_modal");
            self.state.presented = None;
            self.state.modal_detent_configuration = None;
            self.notify();
        }
    }

    pub fn present_detour(&mut self, initial_route: AnyRoute) {
        crate::debug_log!("router: present_detour {}", initial_route.identifier());
        self.state.detour = Some(initial_route);
        self.notify();
    }

    pub fn dismiss_detour(&mut self) {
        if self.state.detour.is_some() {
            crate::debug_log!("router: dismiss_detour");
            self.state.detour = None;
            self.notify();
        }
    }

    pub fn push_child(&mut self, child: ChildRef) {
        self.state.pushed_children.push(child);
        crate::trace_log!("router: push_child (now {} deep)", self.state.pushed_children.len());
        self.notify();
    }

    pub fn pop_child(&mut self) {
        if self.state.pushed_children.pop().is_some() {
            crate::trace_log!("router: pop_child (now {} deep)", self.state.pushed_children.len());
            self.notify();
        }
    }

    /// Replace `root`, clear `stack`.
    pub fn set_root(&mut self, r: R) {
        crate::info_log!("router: set_root {}", r.identifier());
        self.state.root = r;
        self.state.stack.clear();
        self.notify();
    }

    /// Clear `stack`. Distinct operation name from `pop_to_root` per the
    /// spec's separate `resetToRoot` entry point used by flow transitions;
    /// behaviorally identical.
    pub fn reset_to_root(&mut self) {
        self.pop_to_root();
    }

    pub fn update_modal_ideal_height(&mut self, height: Option<f32>) {
        let detents = self.state.modal_detent_configuration.get_or_insert_with(Default::default);
        detents.ideal_height = height;
        self.notify();
    }

    pub fn update_modal_min_height(&mut self, height: Option<f32>) {
        let detents = self.state.modal_detent_configuration.get_or_insert_with(Default::default);
        detents.min_height = height;
        self.notify();
    }

    pub fn update_modal_selected_detent(&mut self, detent: Option<String>) {
        let detents = self.state.modal_detent_configuration.get_or_insert_with(Default::default);
        detents.selected_detent = detent;
        self.notify();
    }

    /// Subscribe to change notifications. The callback receives one
    /// [`RouteSnapshot`] per accepted mutation, after the transition.
    pub fn subscribe(&mut self, observer: impl Fn(&RouteSnapshot) + 'static) -> SubscriptionId {
        let id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst);
        self.observers.insert(id, Box::new(observer));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.remove(&id.0);
    }

    fn notify(&self) {
        let snapshot = RouteSnapshot {
            root: AnyRoute::new(self.state.root.clone()),
            stack: self.state.stack.iter().cloned().map(AnyRoute::new).collect(),
        };
        for observer in self.observers.values() {
            observer(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Demo {
        Home,
        Detail(u32),
        Settings,
    }

    impl Route for Demo {
        fn identifier(&self) -> String {
            match self {
                Demo::Home => "home".into(),
                Demo::Detail(id) => format!("detail/{id}"),
                Demo::Settings => "settings".into(),
            }
        }
    }

    #[test]
    fn push_and_pop_round_trip() {
        let mut router = Router::new(Demo::Home);
        router.push(Demo::Detail(1));
        assert_eq!(router.current(), &Demo::Detail(1));
        router.pop();
        assert_eq!(router.current(), &Demo::Home);
    }

    #[test]
    fn pop_to_truncates_after_match() {
        let mut router = Router::new(Demo::Home);
        router.push(Demo::Detail(1));
        router.push(Demo::Detail(2));
        router.push(Demo::Settings);
        router.pop_to(&Demo::Detail(1));
        assert_eq!(router.state().stack, vec![Demo::Detail(1)]);
    }

    #[test]
    fn pop_to_unknown_route_is_noop() {
        let mut router = Router::new(Demo::Home);
        router.push(Demo::Detail(1));
        router.pop_to(&Demo::Settings);
        assert_eq!(router.state().stack, vec![Demo::Detail(1)]);
    }

    #[test]
    fn replace_prevents_back_to_replaced_route() {
        let mut router = Router::new(Demo::Home);
        router.push(Demo::Detail(1));
        router.replace(Demo::Detail(2));
        assert_eq!(router.state().stack, vec![Demo::Detail(2)]);
        router.pop();
        assert!(router.state().stack.is_empty());
    }

    #[test]
    fn set_root_clears_stack() {
        let mut router = Router::new(Demo::Home);
        router.push(Demo::Detail(1));
        router.set_root(Demo::Settings);
        assert_eq!(router.state().root, Demo::Settings);
        assert!(router.state().stack.is_empty());
    }

    #[test]
    fn subscribers_receive_one_event_per_accepted_mutation() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut router = Router::new(Demo::Home);
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let id = router.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        router.push(Demo::Detail(1));
        router.pop_to(&Demo::Settings); // no-op: should not notify
        router.pop();

        assert_eq!(count.get(), 2);

        router.unsubscribe(id);
        router.push(Demo::Detail(3));
        assert_eq!(count.get(), 2);
    }
}
