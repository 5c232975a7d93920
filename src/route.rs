//! Route model: the polymorphic navigation target.
//!
//! A [`Route`] is a value-type with a stable [`Route::identifier`] used for
//! logging and cross-type comparisons, and equality within one concrete
//! route type. Different coordinator subtrees use different concrete route
//! types; the engine treats a route either as its concrete type `R` (for
//! "owned" operations on one router) or as an opaque [`AnyRoute`] when it
//! crosses a coordinator boundary whose concrete route type it does not
//! know.

use std::any::{Any, TypeId};
use std::fmt;

/// A navigation target understood by exactly one coordinator subtree.
///
/// Implementors are typically small enums (screens within one flow).
/// `identifier` must be stable across equal values and unique among
/// distinguishable routes — it is the only thing an [`AnyRoute`] exposes
/// about a route once its concrete type has been erased.
pub trait Route: Clone + PartialEq + fmt::Debug + Any + 'static {
    /// Stable identifier used for logging and for matching against a
    /// coordinator's own root route identifier across type boundaries.
    fn identifier(&self) -> String;
}

/// How execution applies a route once a coordinator decides to handle it.
///
/// Detour is intentionally not a member of this sum — it is a distinct,
/// explicitly-invoked operation (see [`crate::coordinator`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Push the route onto the router's stack.
    Push,
    /// Replace the top of the router's stack (no back-navigation to what
    /// was replaced).
    Replace,
    /// Present the route as a modal overlay.
    Modal,
    /// Switch to the tab at the given index.
    TabSwitch(u32),
}

/// A type-erased route value crossing a coordinator-subtree boundary.
///
/// Carries enough to compare identity (`identifier`, `type_id`) and to be
/// downcast back to a concrete `R` by the one coordinator that knows `R`.
/// Coordinators that only need to compare or log a route never have to
/// downcast it.
#[derive(Clone)]
pub struct AnyRoute {
    identifier: String,
    type_id: TypeId,
    value: std::rc::Rc<dyn Any>,
}

impl AnyRoute {
    /// Erase a concrete route into an `AnyRoute`.
    pub fn new<R: Route>(route: R) -> Self {
        Self {
            identifier: route.identifier(),
            type_id: TypeId::of::<R>(),
            value: std::rc::Rc::new(route),
        }
    }

    /// The route's stable identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// `true` if this value was erased from concrete type `R`.
    pub fn is_type<R: Route>(&self) -> bool {
        self.type_id == TypeId::of::<R>()
    }

    /// Attempt to recover the concrete route. Returns `None` if `R` does
    /// not match the type this value was erased from.
    pub fn downcast<R: Route>(&self) -> Option<R> {
        self.value.downcast_ref::<R>().cloned()
    }
}

impl fmt::Debug for AnyRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyRoute")
            .field("identifier", &self.identifier)
            .finish()
    }
}

impl PartialEq for AnyRoute {
    /// Two erased routes are equal iff they came from the same concrete
    /// type and have the same identifier. This is the cross-type-boundary
    /// notion of "same route" used throughout smart navigation.
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.identifier == other.identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Demo {
        Home,
        Detail(u32),
    }

    impl Route for Demo {
        fn identifier(&self) -> String {
            match self {
                Demo::Home => "home".into(),
                Demo::Detail(id) => format!("detail/{id}"),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Other {
        Settings,
    }

    impl Route for Other {
        fn identifier(&self) -> String {
            "settings".into()
        }
    }

    #[test]
    fn any_route_roundtrips_through_downcast() {
        let erased = AnyRoute::new(Demo::Detail(7));
        assert_eq!(erased.identifier(), "detail/7");
        assert_eq!(erased.downcast::<Demo>(), Some(Demo::Detail(7)));
        assert_eq!(erased.downcast::<Other>(), None);
    }

    #[test]
    fn any_route_equality_requires_same_concrete_type() {
        let a = AnyRoute::new(Demo::Home);
        let b = AnyRoute::new(Other::Settings);
        // identifiers differ, so this would already be unequal, but the
        // type check must also reject a same-identifier different-type
        // collision.
        assert_ne!(a, b);
    }
}
