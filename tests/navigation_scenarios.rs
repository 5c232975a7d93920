//! End-to-end navigation scenarios.
//!
//! Walks through a single multi-level tree — mirroring `demos/tab_modal_detour.rs`
//! without the GPUI rendering — and exercises it the way `spec.md` §8's
//! "Concrete end-to-end scenarios" describe: a deep link from the tree root
//! that crosses a tab boundary, a modal boundary, and a pushed-child
//! boundary in one `navigate` call, followed by the cleanup that happens
//! when a later call bubbles back out through all of them.

use gpui_flow_coordinator::{
    AnyRoute, Coordinator, CoordinatorDelegate, CoordinatorNode, NavigationKind, Route,
    TabCoordinator,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum MainTabRoute {
    Tab1,
    Tab2,
    Tab3,
    Tab4,
    Tab5,
}

impl Route for MainTabRoute {
    fn identifier(&self) -> String {
        match self {
            MainTabRoute::Tab1 => "tab1".into(),
            MainTabRoute::Tab2 => "tab2".into(),
            MainTabRoute::Tab3 => "tab3".into(),
            MainTabRoute::Tab4 => "tab4".into(),
            MainTabRoute::Tab5 => "tab5".into(),
        }
    }
}

struct MainTabDelegate;
impl CoordinatorDelegate<MainTabRoute> for MainTabDelegate {
    fn can_handle(&self, _route: &MainTabRoute) -> bool {
        true
    }
    fn navigation_type(&self, route: &MainTabRoute) -> NavigationKind {
        match route {
            MainTabRoute::Tab1 => NavigationKind::TabSwitch(0),
            MainTabRoute::Tab2 => NavigationKind::TabSwitch(1),
            MainTabRoute::Tab3 => NavigationKind::TabSwitch(2),
            MainTabRoute::Tab4 => NavigationKind::TabSwitch(3),
            MainTabRoute::Tab5 => NavigationKind::TabSwitch(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum LeafRoute {
    Home,
}

impl Route for LeafRoute {
    fn identifier(&self) -> String {
        "home".into()
    }
}

struct AlwaysPush;
impl CoordinatorDelegate<LeafRoute> for AlwaysPush {
    fn can_handle(&self, _route: &LeafRoute) -> bool {
        true
    }
    fn navigation_type(&self, _route: &LeafRoute) -> NavigationKind {
        NavigationKind::Push
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tab2Route {
    Home,
}

impl Route for Tab2Route {
    fn identifier(&self) -> String {
        "tab2_home".into()
    }
}

struct Tab2Delegate;
impl CoordinatorDelegate<Tab2Route> for Tab2Delegate {
    fn can_handle(&self, _route: &Tab2Route) -> bool {
        true
    }
    fn navigation_type(&self, _route: &Tab2Route) -> NavigationKind {
        NavigationKind::Push
    }
}

#[derive(Debug, Clone, PartialEq)]
enum UnlockRoute {
    Start,
    Success,
}

impl Route for UnlockRoute {
    fn identifier(&self) -> String {
        match self {
            UnlockRoute::Start => "unlock_start".into(),
            UnlockRoute::Success => "unlock_success".into(),
        }
    }
}

struct UnlockDelegate;
impl CoordinatorDelegate<UnlockRoute> for UnlockDelegate {
    fn can_handle(&self, _route: &UnlockRoute) -> bool {
        true
    }
    fn navigation_type(&self, route: &UnlockRoute) -> NavigationKind {
        match route {
            UnlockRoute::Start => NavigationKind::Push,
            UnlockRoute::Success => NavigationKind::Modal,
        }
    }
}

struct UnlockModalDelegate;
impl CoordinatorDelegate<UnlockRoute> for UnlockModalDelegate {
    fn can_handle(&self, _route: &UnlockRoute) -> bool {
        true
    }
    fn navigation_type(&self, _route: &UnlockRoute) -> NavigationKind {
        NavigationKind::Push
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tab5Route {
    Home,
    BatteryStatus,
}

impl Route for Tab5Route {
    fn identifier(&self) -> String {
        match self {
            Tab5Route::Home => "tab5_home".into(),
            Tab5Route::BatteryStatus => "battery_status".into(),
        }
    }
}

struct Tab5Delegate;
impl CoordinatorDelegate<Tab5Route> for Tab5Delegate {
    fn can_handle(&self, _route: &Tab5Route) -> bool {
        true
    }
    fn navigation_type(&self, _route: &Tab5Route) -> NavigationKind {
        NavigationKind::Push
    }
}

type MainTabHandle = Rc<RefCell<TabCoordinator<MainTabRoute, MainTabDelegate>>>;
type LeafHandle = Rc<RefCell<Coordinator<LeafRoute, AlwaysPush>>>;
type Tab2Handle = Rc<RefCell<Coordinator<Tab2Route, Tab2Delegate>>>;
type UnlockHandle = Rc<RefCell<Coordinator<UnlockRoute, UnlockDelegate>>>;
type UnlockModalHandle = Rc<RefCell<Coordinator<UnlockRoute, UnlockModalDelegate>>>;
type Tab5Handle = Rc<RefCell<Coordinator<Tab5Route, Tab5Delegate>>>;

struct Tree {
    main_tab: MainTabHandle,
    tab2: Tab2Handle,
    unlock: UnlockHandle,
    #[allow(dead_code)]
    unlock_modal: UnlockModalHandle,
    tab5: Tab5Handle,
    battery_detour: Tab5Handle,
}

fn build_tree() -> Tree {
    let leaf1 = Coordinator::new_root(LeafRoute::Home, AlwaysPush, "Tab1");
    let leaf3 = Coordinator::new_root(LeafRoute::Home, AlwaysPush, "Tab3");
    let leaf4 = Coordinator::new_root(LeafRoute::Home, AlwaysPush, "Tab4");
    let tab5: Tab5Handle = Coordinator::new_root(Tab5Route::Home, Tab5Delegate, "Tab5");
    let battery_detour: Tab5Handle =
        Coordinator::new_root(Tab5Route::BatteryStatus, Tab5Delegate, "BatteryDetour");

    let unlock: UnlockHandle = Coordinator::new_root(UnlockRoute::Start, UnlockDelegate, "Unlock");
    let unlock_modal: UnlockModalHandle =
        Coordinator::new_root(UnlockRoute::Success, UnlockModalDelegate, "UnlockSuccessModal");
    unlock.borrow_mut().add_modal_coordinator(unlock_modal.clone());

    let tab2: Tab2Handle = Coordinator::new_root(Tab2Route::Home, Tab2Delegate, "Tab2");
    tab2.borrow_mut().add_child(unlock.clone());

    let main_tab: MainTabHandle = TabCoordinator::new_root(MainTabRoute::Tab1, MainTabDelegate, "MainTab");
    {
        let mut main_tab_mut = main_tab.borrow_mut();
        main_tab_mut.add_tab(leaf1.clone());
        main_tab_mut.add_tab(tab2.clone());
        main_tab_mut.add_tab(leaf3.clone());
        main_tab_mut.add_tab(leaf4.clone());
        main_tab_mut.add_tab(tab5.clone());
    }

    Tree {
        main_tab,
        tab2,
        unlock,
        unlock_modal,
        tab5,
        battery_detour,
    }
}

/// Scenario 1 — deep link into tab + modal from unrelated tab.
///
/// Root is `MainTab{tab1..tab5}` with `tab1` selected. Tab2 hosts an
/// `Unlock` child rooted at `unlock_start`. A single `navigate` call for
/// `UnlockRoute::Success`, issued at the tree root, switches to tab2,
/// pushes `Unlock` into tab2's stack, and presents `Unlock`'s success modal.
#[test]
fn deep_link_crosses_tab_and_modal_boundaries() {
    let tree = build_tree();

    let accepted = tree
        .main_tab
        .borrow_mut()
        .navigate(&AnyRoute::new(UnlockRoute::Success), None);

    assert!(accepted);
    assert_eq!(tree.main_tab.borrow().core().router().state().selected_tab, 1);
    assert_eq!(tree.tab2.borrow().core().router().state().pushed_children.len(), 1);
    assert!(tree.tab2.borrow().core().router().state().pushed_children[0]
        .upgrade()
        .is_some_and(|child| child.borrow().root_identifier() == "unlock_start"));
    assert!(tree.unlock.borrow().core().router().state().stack.is_empty());
    assert!(tree.unlock.borrow().core().current_modal_coordinator().is_some());
    assert_eq!(
        tree.unlock.borrow().core().router().state().presented,
        Some(UnlockRoute::Success)
    );
}

/// Scenario 2 — cross-type smart back from modal.
///
/// Continuing scenario 1: a `navigate(MainTabRoute::Tab3)` issued from
/// *inside* the modal bubbles all the way to the root. Along the way the
/// modal is dismissed and tab2's pushed `Unlock` child is popped, since
/// neither can handle a `MainTabRoute` and the route is eventually absorbed
/// by `MainTab` itself as a plain tab switch.
#[test]
fn cross_type_navigation_from_modal_bubbles_and_cleans_up() {
    let tree = build_tree();
    tree.main_tab
        .borrow_mut()
        .navigate(&AnyRoute::new(UnlockRoute::Success), None);
    let modal = tree.unlock.borrow().core().current_modal_coordinator().unwrap();

    let accepted = modal.borrow_mut().navigate(&AnyRoute::new(MainTabRoute::Tab3), None);

    assert!(accepted);
    assert!(tree.unlock.borrow().core().current_modal_coordinator().is_none());
    assert!(tree.unlock.borrow().core().router().state().presented.is_none());
    assert!(tree.tab2.borrow().core().router().state().pushed_children.is_empty());
    assert!(tree.tab2.borrow().core().router().state().stack.is_empty());
    assert_eq!(tree.main_tab.borrow().core().router().state().selected_tab, 2);
}

/// Scenario 3 — a detour preserves the presenting coordinator's stack.
///
/// `Unlock` has pushed `Start` then... here we push two routes onto its own
/// stack to mirror `[loading, failure]` from the spec's narrative, then
/// present a detour. The detour must not disturb `Unlock`'s stack, and
/// dismissing it must leave that stack exactly as it was.
#[test]
fn detour_preserves_presenter_stack_and_dismisses_cleanly() {
    let tree = build_tree();
    tree.unlock.borrow_mut().navigate(&AnyRoute::new(UnlockRoute::Start), None);
    // `Start` is `Unlock`'s own root so this is a smart-nav no-op; push two
    // distinguishable stand-in routes the way the spec's `[loading, failure]`
    // narrative does, via direct router access (no delegate models these as
    // separate variants here — the detour behavior under test does not
    // depend on what the stack contains, only that it is left untouched).
    tree.unlock.borrow_mut().core_mut().router_mut().push(UnlockRoute::Success);
    tree.unlock.borrow_mut().core_mut().router_mut().push(UnlockRoute::Start);
    let stack_before = tree.unlock.borrow().core().router().state().stack.clone();

    tree.unlock
        .borrow_mut()
        .present_detour(tree.battery_detour.clone(), AnyRoute::new(Tab5Route::BatteryStatus));

    assert_eq!(tree.unlock.borrow().core().router().state().stack, stack_before);
    assert!(tree.unlock.borrow().core().router().state().detour.is_some());
    assert!(tree.unlock.borrow().core().detour_coordinator().is_some());

    tree.unlock.borrow_mut().dismiss_detour();

    assert_eq!(tree.unlock.borrow().core().router().state().stack, stack_before);
    assert!(tree.unlock.borrow().core().router().state().detour.is_none());
    assert!(tree.unlock.borrow().core().detour_coordinator().is_none());
}

/// Scenario 4 — validation atomicity (I1).
///
/// From the state scenario 3 sets up (before dismissing the detour), a
/// route nothing in the tree can handle must leave every coordinator's
/// state exactly as it was and report failure, with no partial pop or
/// dismissal of the live detour.
#[test]
fn unhandled_route_leaves_tree_untouched() {
    let tree = build_tree();
    tree.unlock.borrow_mut().core_mut().router_mut().push(UnlockRoute::Success);
    tree.unlock.borrow_mut().core_mut().router_mut().push(UnlockRoute::Start);
    tree.unlock
        .borrow_mut()
        .present_detour(tree.battery_detour.clone(), AnyRoute::new(Tab5Route::BatteryStatus));
    let stack_before = tree.unlock.borrow().core().router().state().stack.clone();
    let selected_before = tree.main_tab.borrow().core().router().state().selected_tab;

    #[derive(Debug, Clone, PartialEq)]
    enum Unreachable {
        X,
    }
    impl Route for Unreachable {
        fn identifier(&self) -> String {
            "unreachable_x".into()
        }
    }

    let accepted = tree
        .main_tab
        .borrow_mut()
        .navigate(&AnyRoute::new(Unreachable::X), None);

    assert!(!accepted);
    assert_eq!(tree.unlock.borrow().core().router().state().stack, stack_before);
    assert!(tree.unlock.borrow().core().detour_coordinator().is_some());
    assert!(tree.unlock.borrow().core().current_modal_coordinator().is_none());
    assert_eq!(tree.main_tab.borrow().core().router().state().selected_tab, selected_before);
}

/// Scenario 6 — `Replace` prevents back-navigation to the replaced route.
#[test]
fn replace_prevents_pop_back_to_replaced_route() {
    #[derive(Debug, Clone, PartialEq)]
    enum AB {
        A,
        B,
    }
    impl Route for AB {
        fn identifier(&self) -> String {
            match self {
                AB::A => "a".into(),
                AB::B => "b".into(),
            }
        }
    }
    struct ReplaceB;
    impl CoordinatorDelegate<AB> for ReplaceB {
        fn can_handle(&self, _route: &AB) -> bool {
            true
        }
        fn navigation_type(&self, route: &AB) -> NavigationKind {
            match route {
                AB::A => NavigationKind::Push,
                AB::B => NavigationKind::Replace,
            }
        }
    }

    let root = Coordinator::new_root(AB::A, ReplaceB, "Root");
    // Root route is `A`; push nothing, instead navigate directly to a
    // distinguishable first push so `stack == [a_child]`, matching the
    // spec's `stack = [a]` starting point.
    root.borrow_mut().core_mut().router_mut().push(AB::A);
    assert_eq!(root.borrow().core().router().state().stack, vec![AB::A]);

    root.borrow_mut().navigate(&AnyRoute::new(AB::B), None);
    assert_eq!(root.borrow().core().router().state().stack, vec![AB::B]);

    root.borrow_mut().pop();
    assert!(root.borrow().core().router().state().stack.is_empty());
}
