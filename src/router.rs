// ============================================================================
// spark-components - Router
// Path → component routing over an in-memory history
// ============================================================================
//
// The router owns an outlet element and a history stack. Navigating destroys
// the component currently shown, clears the outlet and mounts the new route's
// component there. `back` / `forward` move through history and re-render
// without pushing, the way a browser's popstate does.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::component::Component;
use crate::dom::Node;
use crate::error::{Error, Result};

#[derive(Clone)]
struct Route {
    path: String,
    component: Component,
}

#[derive(Default)]
struct RouterInner {
    routes: RefCell<Vec<Route>>,
    root: RefCell<Option<Node>>,
    current: RefCell<Option<Component>>,
    history: RefCell<Vec<String>>,
    /// Index of the current history entry
    cursor: Cell<usize>,
}

/// Maps paths to components. Cloning gives another handle to the same router.
///
/// ```
/// use spark_components::{state, Component, ComponentOptions, Node, Router};
///
/// let router = Router::with_root(&Node::element("main"));
/// router.add_route("/", Component::new(ComponentOptions::new("home", || state!({}))));
/// router.add_route("/about", Component::new(ComponentOptions::new("about", || state!({}))));
///
/// assert!(router.navigate("/about").unwrap());
/// assert_eq!(router.current_path().as_deref(), Some("/about"));
/// assert!(!router.navigate("/missing").unwrap());
/// ```
#[derive(Clone, Default)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: &Node) -> Self {
        let router = Self::new();
        router.set_root_element(root);
        router
    }

    /// Set the outlet routed components are mounted into.
    pub fn set_root_element(&self, root: &Node) {
        *self.inner.root.borrow_mut() = Some(root.clone());
    }

    pub fn root_element(&self) -> Option<Node> {
        self.inner.root.borrow().clone()
    }

    /// Register `component` for `path`. The first registration for a path
    /// wins.
    pub fn add_route(&self, path: impl Into<String>, component: Component) {
        self.inner.routes.borrow_mut().push(Route {
            path: path.into(),
            component,
        });
    }

    /// Show the component for `path` and push it onto the history.
    /// Returns false, changing nothing, when no route matches.
    pub fn navigate(&self, path: &str) -> Result<bool> {
        let Some(route) = self.find_route(path) else {
            tracing::debug!(path, "no route");
            return Ok(false);
        };
        let root = self.root_element().ok_or(Error::NoRouterRoot)?;

        {
            let mut history = self.inner.history.borrow_mut();
            if !history.is_empty() {
                history.truncate(self.inner.cursor.get() + 1);
            }
            history.push(path.to_string());
            self.inner.cursor.set(history.len() - 1);
        }

        tracing::debug!(path, "navigate");
        self.show(&root, route)?;
        Ok(true)
    }

    /// Step back one history entry. Returns false at the start of history.
    pub fn back(&self) -> Result<bool> {
        let cursor = self.inner.cursor.get();
        if cursor == 0 {
            return Ok(false);
        }
        self.go_to(cursor - 1)
    }

    /// Step forward one history entry. Returns false at the end of history.
    pub fn forward(&self) -> Result<bool> {
        let next = self.inner.cursor.get() + 1;
        if next >= self.inner.history.borrow().len() {
            return Ok(false);
        }
        self.go_to(next)
    }

    pub fn current_path(&self) -> Option<String> {
        self.inner
            .history
            .borrow()
            .get(self.inner.cursor.get())
            .cloned()
    }

    /// The component currently shown in the outlet
    pub fn current_component(&self) -> Option<Component> {
        self.inner.current.borrow().clone()
    }

    pub fn history(&self) -> Vec<String> {
        self.inner.history.borrow().clone()
    }

    pub fn route_count(&self) -> usize {
        self.inner.routes.borrow().len()
    }

    fn find_route(&self, path: &str) -> Option<Route> {
        self.inner
            .routes
            .borrow()
            .iter()
            .find(|route| route.path == path)
            .cloned()
    }

    fn go_to(&self, index: usize) -> Result<bool> {
        let Some(path) = self.inner.history.borrow().get(index).cloned() else {
            return Ok(false);
        };
        let root = self.root_element().ok_or(Error::NoRouterRoot)?;
        let Some(route) = self.find_route(&path) else {
            return Ok(false);
        };

        self.inner.cursor.set(index);
        tracing::debug!(path = %path, "history move");
        self.show(&root, route)?;
        Ok(true)
    }

    fn show(&self, root: &Node, route: Route) -> Result<()> {
        let previous = self.inner.current.borrow_mut().take();
        if let Some(previous) = previous {
            previous.destroy();
        }

        root.clear_children();
        route.component.mount(root)?;
        *self.inner.current.borrow_mut() = Some(route.component);
        Ok(())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field(
                "routes",
                &self
                    .inner
                    .routes
                    .borrow()
                    .iter()
                    .map(|r| r.path.clone())
                    .collect::<Vec<_>>(),
            )
            .field("history", &*self.inner.history.borrow())
            .field("cursor", &self.inner.cursor.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentOptions, Phase};
    use crate::state;

    fn page(text: &str) -> Component {
        let text = text.to_string();
        Component::new(ComponentOptions::new(text, || state!({})))
    }

    fn router() -> (Router, Node, Component, Component) {
        let root = Node::element("main");
        let router = Router::with_root(&root);
        let (home, about) = (page("home"), page("about"));
        router.add_route("/", home.clone());
        router.add_route("/about", about.clone());
        (router, root, home, about)
    }

    #[test]
    fn navigation_swaps_components() {
        let (router, root, home, about) = router();

        assert!(router.navigate("/").unwrap());
        assert_eq!(root.inner_html(), "<div>home</div>");

        assert!(router.navigate("/about").unwrap());
        assert_eq!(root.inner_html(), "<div>about</div>");
        assert_eq!(home.phase(), Phase::Destroyed);
        assert_eq!(about.phase(), Phase::Mounted);
        assert_eq!(router.history(), ["/", "/about"]);
    }

    #[test]
    fn back_and_forward_do_not_push() {
        let (router, root, home, _) = router();
        router.navigate("/").unwrap();
        router.navigate("/about").unwrap();

        assert!(router.back().unwrap());
        assert_eq!(root.inner_html(), "<div>home</div>");
        assert_eq!(home.phase(), Phase::Mounted);
        assert!(!router.back().unwrap());

        assert!(router.forward().unwrap());
        assert_eq!(router.current_path().as_deref(), Some("/about"));
        assert!(!router.forward().unwrap());
        assert_eq!(router.history().len(), 2);
    }

    #[test]
    fn navigating_after_back_drops_forward_entries() {
        let (router, _, _, _) = router();
        router.navigate("/").unwrap();
        router.navigate("/about").unwrap();
        router.back().unwrap();
        router.navigate("/").unwrap();
        assert_eq!(router.history(), ["/", "/"]);
        assert!(!router.forward().unwrap());
    }

    #[test]
    fn unknown_paths_and_missing_root() {
        let (router, root, _, _) = router();
        assert!(!router.navigate("/nope").unwrap());
        assert!(router.history().is_empty());
        assert_eq!(root.child_count(), 0);

        let rootless = Router::new();
        rootless.add_route("/", page("x"));
        assert_eq!(rootless.navigate("/"), Err(Error::NoRouterRoot));
    }

    #[test]
    fn a_component_with_a_router_becomes_its_outlet() {
        let router = Router::new();
        let shell = Component::new(ComponentOptions::new("", || state!({})).router(&router));
        router.add_route("/", page("home"));

        router.navigate("/").unwrap();
        assert_eq!(shell.html(), "<div>home</div>");
    }
}
