//! View-integration boundary for GPUI.
//!
//! The engine itself never constructs a view — it only tracks *which* route
//! is current. [`ViewFactory<R>`] is the host-supplied collaborator that
//! turns a route into a rendered element; [`CoordinatorOutlet`] is the
//! `Render` widget that reads a coordinator's current route on every render
//! pass and asks the factory to build it, reporting `ViewCreationFailed`
//! through the global error channel (§7) when the factory returns `None`.

use crate::coordinator::RouteHost;
use crate::error::{self, ErrorContext, FlowError, ViewSlot};
use crate::route::Route;
use gpui::{AnyElement, Context, IntoElement, Render, Window};
use std::cell::RefCell;
use std::rc::Rc;

/// Whatever a [`ViewFactory`] hands back for a route; opaque to the engine.
pub type OpaqueView = AnyElement;

/// Host collaborator mapping a route to a rendered view (§6 "ViewFactory").
/// The engine holds a reference but never inspects the result.
pub trait ViewFactory<R: Route> {
    /// Build the view for `route`. `None` signals view creation failed —
    /// [`CoordinatorOutlet`] reports it via [`error::report`] and renders
    /// nothing rather than panicking.
    fn build_view(&self, route: &R, window: &mut Window, cx: &mut gpui::App) -> Option<OpaqueView>;
}

/// Renders the current route of one coordinator, re-reading it on every
/// render pass. One outlet per coordinator whose state can change
/// independently (root, each pushed child, each modal/detour slot).
pub struct CoordinatorOutlet<R, H>
where
    R: Route,
    H: RouteHost<R> + 'static,
{
    host: Rc<RefCell<H>>,
    factory: Rc<dyn ViewFactory<R>>,
    slot: ViewSlot,
    label: String,
}

impl<R, H> CoordinatorOutlet<R, H>
where
    R: Route,
    H: RouteHost<R> + 'static,
{
    /// `label`/`slot` feed the `ErrorContext` reported if `factory` ever
    /// returns `None` for this outlet's current route.
    pub fn new(
        host: Rc<RefCell<H>>,
        factory: Rc<dyn ViewFactory<R>>,
        slot: ViewSlot,
        label: impl Into<String>,
    ) -> Self {
        Self {
            host,
            factory,
            slot,
            label: label.into(),
        }
    }
}

impl<R, H> Render for CoordinatorOutlet<R, H>
where
    R: Route,
    H: RouteHost<R> + 'static,
{
    fn render(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) -> impl IntoElement {
        let route = self.host.borrow().current_route();
        let identifier = route.identifier();

        match self.factory.build_view(&route, window, cx) {
            Some(view) => view,
            None => {
                error::report(&FlowError::ViewCreationFailed(
                    ErrorContext::new(self.label.clone(), identifier, std::any::type_name::<R>()),
                    self.slot,
                ));
                gpui::div().into_any_element()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{Coordinator, CoordinatorDelegate, NodeHandle};
    use crate::route::NavigationKind;

    #[derive(Debug, Clone, PartialEq)]
    enum Demo {
        Home,
        Detail,
    }

    impl Route for Demo {
        fn identifier(&self) -> String {
            match self {
                Demo::Home => "home".into(),
                Demo::Detail => "detail".into(),
            }
        }
    }

    struct AlwaysPush;
    impl CoordinatorDelegate<Demo> for AlwaysPush {
        fn can_handle(&self, _route: &Demo) -> bool {
            true
        }
        fn navigation_type(&self, _route: &Demo) -> NavigationKind {
            NavigationKind::Push
        }
    }

    #[test]
    fn current_route_reflects_navigation() {
        let root: NodeHandle = Coordinator::new_root(Demo::Home, AlwaysPush, "Root");
        root.borrow_mut().navigate(&crate::route::AnyRoute::new(Demo::Detail), None);
        assert_eq!(root.borrow().current_route_identifier(), "detail");
    }
}
