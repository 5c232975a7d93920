//! Tab + modal + detour demo.
//!
//! Five tabs under one `TabCoordinator`; tab 2 hosts a nested `Unlock` flow
//! that presents a modal on success and can open a battery-status detour
//! without losing its own place. Mirrors the deep-link scenario the engine
//! is built around: calling `navigate` from outside the tree with a route
//! several levels down switches tabs, pushes the nested flow, and presents
//! its modal, all in one call.

use gpui::{
    div, px, rgb, size, App, AppContext, Application, Bounds, Context, Entity, InteractiveElement,
    IntoElement, MouseButton, ParentElement, Render, Styled, TitlebarOptions, Window, WindowBounds,
    WindowOptions,
};
use gpui_flow_coordinator::{
    init_coordinator_host, AnyRoute, Coordinator, CoordinatorDelegate, CoordinatorOutlet,
    NavigationKind, Route, TabCoordinator, UseCoordinator, ViewFactory, ViewSlot,
};
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    env_logger::init();

    Application::new().run(|cx: &mut App| {
        let tree = build_tree();
        init_coordinator_host(cx, tree.main_tab.clone());

        let bounds = Bounds::centered(None, size(px(900.), px(640.)), cx);
        cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                titlebar: Some(TitlebarOptions {
                    title: Some("Tab + Modal + Detour Demo".into()),
                    appears_transparent: false,
                    traffic_light_position: None,
                }),
                ..Default::default()
            },
            |_, cx| cx.new(|cx| DemoApp::new(tree, cx)),
        )
        .unwrap();

        cx.activate(true);
    });
}

// ============================================================================
// Routes
// ============================================================================

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

/// Shared placeholder route for the three tabs that carry no nested state.
#[derive(Debug, Clone, PartialEq)]
enum LeafRoute {
    Home,
}

impl Route for LeafRoute {
    fn identifier(&self) -> String {
        "home".into()
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

/// The nested flow under tab 2 — the thing a deep link reaches past the
/// tab bar and past `Tab2Route` itself.
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

// ============================================================================
// Delegates
// ============================================================================

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

struct AlwaysPush;
impl CoordinatorDelegate<LeafRoute> for AlwaysPush {
    fn can_handle(&self, _route: &LeafRoute) -> bool {
        true
    }
    fn navigation_type(&self, _route: &LeafRoute) -> NavigationKind {
        NavigationKind::Push
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

/// Delegate for the modal itself — only ever reached by being its
/// registered root, never by `can_handle` directly.
struct UnlockModalDelegate;
impl CoordinatorDelegate<UnlockRoute> for UnlockModalDelegate {
    fn can_handle(&self, _route: &UnlockRoute) -> bool {
        true
    }
    fn navigation_type(&self, _route: &UnlockRoute) -> NavigationKind {
        NavigationKind::Push
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

// ============================================================================
// Tree construction
// ============================================================================

type MainTabHandle = Rc<RefCell<TabCoordinator<MainTabRoute, MainTabDelegate>>>;
type LeafHandle = Rc<RefCell<Coordinator<LeafRoute, AlwaysPush>>>;
type Tab2Handle = Rc<RefCell<Coordinator<Tab2Route, Tab2Delegate>>>;
type UnlockHandle = Rc<RefCell<Coordinator<UnlockRoute, UnlockDelegate>>>;
type UnlockModalHandle = Rc<RefCell<Coordinator<UnlockRoute, UnlockModalDelegate>>>;
type Tab5Handle = Rc<RefCell<Coordinator<Tab5Route, Tab5Delegate>>>;

/// Every concrete handle the demo app needs to keep alive and poke at
/// directly — the parts no generic `NodeHandle` lets you reach.
struct Tree {
    main_tab: MainTabHandle,
    leaf1: LeafHandle,
    tab2: Tab2Handle,
    unlock: UnlockHandle,
    unlock_modal: UnlockModalHandle,
    leaf3: LeafHandle,
    leaf4: LeafHandle,
    tab5: Tab5Handle,
    battery_detour: Tab5Handle,
}

fn build_tree() -> Tree {
    let leaf1 = Coordinator::new_root(LeafRoute::Home, AlwaysPush, "Tab1");
    let leaf3 = Coordinator::new_root(LeafRoute::Home, AlwaysPush, "Tab3");
    let leaf4 = Coordinator::new_root(LeafRoute::Home, AlwaysPush, "Tab4");
    let tab5 = Coordinator::new_root(Tab5Route::Home, Tab5Delegate, "Tab5");
    let battery_detour = Coordinator::new_root(Tab5Route::BatteryStatus, Tab5Delegate, "BatteryDetour");

    let unlock: UnlockHandle = Coordinator::new_root(UnlockRoute::Start, UnlockDelegate, "Unlock");
    let unlock_modal: UnlockModalHandle =
        Coordinator::new_root(UnlockRoute::Success, UnlockModalDelegate, "UnlockSuccessModal");
    unlock.borrow_mut().add_modal_coordinator(unlock_modal.clone());

    let tab2: Tab2Handle = Coordinator::new_root(Tab2Route::Home, Tab2Delegate, "Tab2");
    tab2.borrow_mut().add_child(unlock.clone());

    let main_tab: MainTabHandle =
        TabCoordinator::new_root(MainTabRoute::Tab1, MainTabDelegate, "MainTab");
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
        leaf1,
        tab2,
        unlock,
        unlock_modal,
        leaf3,
        leaf4,
        tab5,
        battery_detour,
    }
}

// ============================================================================
// View factories
// ============================================================================

struct LeafViewFactory {
    label: &'static str,
}

impl ViewFactory<LeafRoute> for LeafViewFactory {
    fn build_view(&self, _route: &LeafRoute, _window: &mut Window, _cx: &mut App) -> Option<gpui_flow_coordinator::OpaqueView> {
        Some(
            div()
                .p_4()
                .child(format!("{} — nothing to see here", self.label))
                .into_any_element(),
        )
    }
}

struct Tab2ViewFactory;
impl ViewFactory<Tab2Route> for Tab2ViewFactory {
    fn build_view(&self, _route: &Tab2Route, _window: &mut Window, _cx: &mut App) -> Option<gpui_flow_coordinator::OpaqueView> {
        Some(div().p_4().child("Tab 2 — hosts the Unlock flow below").into_any_element())
    }
}

struct UnlockViewFactory;
impl ViewFactory<UnlockRoute> for UnlockViewFactory {
    fn build_view(&self, route: &UnlockRoute, _window: &mut Window, _cx: &mut App) -> Option<gpui_flow_coordinator::OpaqueView> {
        let text = match route {
            UnlockRoute::Start => "Unlock flow: not started",
            UnlockRoute::Success => "Unlock flow: succeeded",
        };
        Some(div().p_4().bg(rgb(0x2d2d2d)).rounded_md().child(text).into_any_element())
    }
}

struct Tab5ViewFactory;
impl ViewFactory<Tab5Route> for Tab5ViewFactory {
    fn build_view(&self, route: &Tab5Route, _window: &mut Window, _cx: &mut App) -> Option<gpui_flow_coordinator::OpaqueView> {
        let text = match route {
            Tab5Route::Home => "Tab 5 — settings",
            Tab5Route::BatteryStatus => "Battery: 87%",
        };
        Some(div().p_4().child(text).into_any_element())
    }
}

// ============================================================================
// App shell
// ============================================================================

struct DemoApp {
    tree: Tree,
    leaf1_outlet: Entity<CoordinatorOutlet<LeafRoute, Coordinator<LeafRoute, AlwaysPush>>>,
    tab2_outlet: Entity<CoordinatorOutlet<Tab2Route, Coordinator<Tab2Route, Tab2Delegate>>>,
    unlock_outlet: Entity<CoordinatorOutlet<UnlockRoute, Coordinator<UnlockRoute, UnlockDelegate>>>,
    unlock_modal_outlet: Entity<CoordinatorOutlet<UnlockRoute, Coordinator<UnlockRoute, UnlockModalDelegate>>>,
    leaf3_outlet: Entity<CoordinatorOutlet<LeafRoute, Coordinator<LeafRoute, AlwaysPush>>>,
    leaf4_outlet: Entity<CoordinatorOutlet<LeafRoute, Coordinator<LeafRoute, AlwaysPush>>>,
    tab5_outlet: Entity<CoordinatorOutlet<Tab5Route, Coordinator<Tab5Route, Tab5Delegate>>>,
    battery_outlet: Entity<CoordinatorOutlet<Tab5Route, Coordinator<Tab5Route, Tab5Delegate>>>,
}

impl DemoApp {
    fn new(tree: Tree, cx: &mut Context<'_, Self>) -> Self {
        let leaf1_outlet = cx.new(|_| {
            CoordinatorOutlet::new(
                tree.leaf1.clone(),
                Rc::new(LeafViewFactory { label: "Tab1" }),
                ViewSlot::Root,
                "Tab1",
            )
        });
        let tab2_outlet = cx.new(|_| {
            CoordinatorOutlet::new(tree.tab2.clone(), Rc::new(Tab2ViewFactory), ViewSlot::Root, "Tab2")
        });
        let unlock_outlet = cx.new(|_| {
            CoordinatorOutlet::new(tree.unlock.clone(), Rc::new(UnlockViewFactory), ViewSlot::Pushed, "Unlock")
        });
        let unlock_modal_outlet = cx.new(|_| {
            CoordinatorOutlet::new(
                tree.unlock_modal.clone(),
                Rc::new(UnlockViewFactory),
                ViewSlot::Modal,
                "UnlockSuccessModal",
            )
        });
        let leaf3_outlet = cx.new(|_| {
            CoordinatorOutlet::new(tree.leaf3.clone(), Rc::new(LeafViewFactory { label: "Tab3" }), ViewSlot::Root, "Tab3")
        });
        let leaf4_outlet = cx.new(|_| {
            CoordinatorOutlet::new(tree.leaf4.clone(), Rc::new(LeafViewFactory { label: "Tab4" }), ViewSlot::Root, "Tab4")
        });
        let tab5_outlet = cx.new(|_| {
            CoordinatorOutlet::new(tree.tab5.clone(), Rc::new(Tab5ViewFactory), ViewSlot::Root, "Tab5")
        });
        let battery_outlet = cx.new(|_| {
            CoordinatorOutlet::new(tree.battery_detour.clone(), Rc::new(Tab5ViewFactory), ViewSlot::Detour, "BatteryDetour")
        });

        Self {
            tree,
            leaf1_outlet,
            tab2_outlet,
            unlock_outlet,
            unlock_modal_outlet,
            leaf3_outlet,
            leaf4_outlet,
            tab5_outlet,
            battery_outlet,
        }
    }

    fn nav_button(&self, cx: &mut Context<'_, Self>, label: &str, route: MainTabRoute) -> impl IntoElement {
        let label = label.to_string();
        div()
            .px_4()
            .py_2()
            .bg(rgb(0x404040))
            .rounded_md()
            .cursor_pointer()
            .hover(|style| style.bg(rgb(0x505050)))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |_view, _event, _window, cx| {
                    cx.navigate_coordinator(AnyRoute::new(route.clone()));
                }),
            )
            .child(label)
    }

    fn unlock_success_button(&self, cx: &mut Context<'_, Self>) -> impl IntoElement {
        div()
            .px_4()
            .py_2()
            .bg(rgb(0x2e6b2e))
            .rounded_md()
            .cursor_pointer()
            .hover(|style| style.bg(rgb(0x3a8a3a)))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|_view, _event, _window, cx| {
                    // Deep link: issued at the tree root, several levels above
                    // the coordinator that actually handles it. Switches to
                    // tab 2, pushes Unlock, and presents its success modal,
                    // all from this one call.
                    cx.navigate_coordinator(AnyRoute::new(UnlockRoute::Success));
                }),
            )
            .child("Unlock → Success (deep link)")
    }

    fn dismiss_modal_button(&self, cx: &mut Context<'_, Self>) -> impl IntoElement {
        let unlock = self.tree.unlock.clone();
        div()
            .px_4()
            .py_2()
            .bg(rgb(0x404040))
            .rounded_md()
            .cursor_pointer()
            .hover(|style| style.bg(rgb(0x505050)))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |_view, _event, _window, cx| {
                    unlock.borrow_mut().dismiss_modal();
                    cx.refresh_windows();
                }),
            )
            .child("Dismiss modal")
    }

    fn show_battery_button(&self, cx: &mut Context<'_, Self>) -> impl IntoElement {
        let unlock = self.tree.unlock.clone();
        let battery_detour = self.tree.battery_detour.clone();
        div()
            .px_4()
            .py_2()
            .bg(rgb(0x404040))
            .rounded_md()
            .cursor_pointer()
            .hover(|style| style.bg(rgb(0x505050)))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |_view, _event, _window, cx| {
                    // Detours are entered explicitly, never through `navigate`:
                    // they overlay Unlock without disturbing its own stack or
                    // modal, so dismissing the detour returns exactly where
                    // Unlock left off.
                    unlock
                        .borrow_mut()
                        .present_detour(battery_detour.clone(), AnyRoute::new(Tab5Route::BatteryStatus));
                    cx.refresh_windows();
                }),
            )
            .child("Show battery status (detour)")
    }

    fn dismiss_detour_button(&self, cx: &mut Context<'_, Self>) -> impl IntoElement {
        let unlock = self.tree.unlock.clone();
        div()
            .px_4()
            .py_2()
            .bg(rgb(0x404040))
            .rounded_md()
            .cursor_pointer()
            .hover(|style| style.bg(rgb(0x505050)))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |_view, _event, _window, cx| {
                    unlock.borrow_mut().dismiss_detour();
                    cx.refresh_windows();
                }),
            )
            .child("Dismiss detour")
    }
}

impl Render for DemoApp {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<'_, Self>) -> impl IntoElement {
        let selected = self.tree.main_tab.borrow().core().router().current().clone();
        let modal_open = self.tree.unlock.borrow().core().current_modal_coordinator().is_some();
        let detour_open = self.tree.unlock.borrow().core().detour_coordinator().is_some();

        let tab_content = match selected {
            MainTabRoute::Tab1 => div().child(self.leaf1_outlet.clone()).into_any_element(),
            MainTabRoute::Tab2 => div()
                .flex()
                .flex_col()
                .gap_4()
                .child(self.tab2_outlet.clone())
                .child(self.unlock_outlet.clone())
                .into_any_element(),
            MainTabRoute::Tab3 => div().child(self.leaf3_outlet.clone()).into_any_element(),
            MainTabRoute::Tab4 => div().child(self.leaf4_outlet.clone()).into_any_element(),
            MainTabRoute::Tab5 => div().child(self.tab5_outlet.clone()).into_any_element(),
        };

        div()
            .flex()
            .flex_col()
            .size_full()
            .bg(rgb(0x1e1e1e))
            .text_color(rgb(0xffffff))
            .child(
                div()
                    .flex()
                    .gap_2()
                    .p_4()
                    .bg(rgb(0x2d2d2d))
                    .border_b_1()
                    .border_color(rgb(0x3e3e3e))
                    .child(self.nav_button(cx, "Tab1", MainTabRoute::Tab1))
                    .child(self.nav_button(cx, "Tab2", MainTabRoute::Tab2))
                    .child(self.nav_button(cx, "Tab3", MainTabRoute::Tab3))
                    .child(self.nav_button(cx, "Tab4", MainTabRoute::Tab4))
                    .child(self.nav_button(cx, "Tab5", MainTabRoute::Tab5))
                    .child(self.unlock_success_button(cx)),
            )
            .child(div().flex_1().p_4().child(tab_content))
            .when(modal_open, |parent| {
                parent.child(
                    div()
                        .absolute()
                        .inset_0()
                        .flex()
                        .items_center()
                        .justify_center()
                        .bg(rgb(0x000000))
                        .child(
                            div()
                                .bg(rgb(0x2d2d2d))
                                .rounded_md()
                                .p_4()
                                .flex()
                                .flex_col()
                                .gap_2()
                                .child(self.unlock_modal_outlet.clone())
                                .child(self.dismiss_modal_button(cx))
                                .child(self.show_battery_button(cx)),
                        ),
                )
            })
            .when(detour_open, |parent| {
                parent.child(
                    div()
                        .absolute()
                        .inset_0()
                        .flex()
                        .items_center()
                        .justify_center()
                        .bg(rgb(0x000000))
                        .child(
                            div()
                                .bg(rgb(0x2d2d2d))
                                .rounded_md()
                                .p_4()
                                .flex()
                                .flex_col()
                                .gap_2()
                                .child(self.battery_outlet.clone())
                                .child(self.dismiss_detour_button(cx)),
                        ),
                )
            })
    }
}
