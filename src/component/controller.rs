// ============================================================================
// spark-components - Component Controller
// Construction, the render effect, mounting, state updates and teardown
// ============================================================================
//
// A component owns one root `<div>` for its whole life; every render replaces
// that element's children wholesale. The render runs as a tracked effect, so
// any state field the template reads re-renders the component when written.
//
// Render pass:
//
//   beforeUpdate → unbind last render's directives → replace children
//   → updated → bind events → apply directives → mount children
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::lifecycle::{Hook, LifecycleHook, Phase};
use super::options::ComponentOptions;
use crate::binder::{apply_directives, bind_events, unbind_directives, BoundDirective};
use crate::binder::{Directives, Methods};
use crate::core::constants::{EFFECT, PLACEHOLDER_ATTR, RENDER_EFFECT};
use crate::core::ReactiveContext;
use crate::dom::{Document, Event, Node};
use crate::error::{Error, Result};
use crate::reactivity::effect::{create_effect, Effect};
use crate::reactivity::{make_reactive, State, StateMap};
use crate::template::{Scope, TemplateEvaluator};

/// Where [`Component::mount`] should attach the root element
#[derive(Debug, Clone)]
pub enum MountTarget {
    /// Resolved with `query_selector` on the component's document
    Selector(String),
    Element(Node),
}

impl From<&str> for MountTarget {
    fn from(selector: &str) -> Self {
        MountTarget::Selector(selector.to_string())
    }
}

impl From<String> for MountTarget {
    fn from(selector: String) -> Self {
        MountTarget::Selector(selector)
    }
}

impl From<Node> for MountTarget {
    fn from(node: Node) -> Self {
        MountTarget::Element(node)
    }
}

impl From<&Node> for MountTarget {
    fn from(node: &Node) -> Self {
        MountTarget::Element(node.clone())
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

struct ComponentInner {
    template: String,
    state: State,
    element: Node,
    document: Document,
    evaluator: TemplateEvaluator,
    methods: Methods,
    directives: Directives,
    children: IndexMap<String, Component>,
    hooks: FxHashMap<LifecycleHook, Vec<Hook>>,

    /// Elements the last render bound directives to
    bound: RefCell<Vec<BoundDirective>>,
    phase: Cell<Phase>,
    renders: Cell<u64>,
    effect: RefCell<Option<Effect>>,
}

/// A reactive component: a template rendered from tracked state into one
/// root element.
///
/// Cloning gives another handle to the same component.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Component {
    /// Build a component. The first render happens here, before
    /// `beforeMount`.
    pub fn new(options: ComponentOptions) -> Self {
        let ComponentOptions {
            template,
            data,
            methods,
            components,
            directives,
            hooks,
            router,
            context,
            document,
        } = options;

        let ctx = context.unwrap_or_else(ReactiveContext::shared);
        let state = make_reactive(&ctx, data());

        let call = |hook: LifecycleHook| {
            for f in hooks.get(&hook).into_iter().flatten() {
                f();
            }
        };

        call(LifecycleHook::BeforeCreate);

        let element = Node::element("div");
        if let Some(router) = &router {
            router.set_root_element(&element);
        }

        let inner = Rc::new(ComponentInner {
            evaluator: TemplateEvaluator::new(components.keys()),
            template,
            state,
            element,
            document: document.unwrap_or_default(),
            methods,
            directives,
            children: components,
            hooks,
            bound: RefCell::new(Vec::new()),
            phase: Cell::new(Phase::Constructed),
            renders: Cell::new(0),
            effect: RefCell::new(None),
        });

        inner.set_phase(Phase::Created);
        inner.call_hook(LifecycleHook::Created);

        let weak: Weak<ComponentInner> = Rc::downgrade(&inner);
        let effect = create_effect(
            &ctx,
            EFFECT | RENDER_EFFECT,
            Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.render();
                }
            }),
        );
        *inner.effect.borrow_mut() = Some(effect);

        inner.call_hook(LifecycleHook::BeforeMount);
        Self { inner }
    }

    /// Attach the root element to `target`.
    ///
    /// A destroyed component may be mounted again.
    pub fn mount(&self, target: impl Into<MountTarget>) -> Result<()> {
        let container = match target.into() {
            MountTarget::Element(node) => node,
            MountTarget::Selector(selector) => self
                .inner
                .document
                .query_selector(&selector)?
                .ok_or_else(|| Error::mount_target_not_found(&selector))?,
        };

        self.inner.call_hook(LifecycleHook::BeforeMount);
        container.append_child(&self.inner.element);
        self.inner.set_phase(Phase::Mounted);
        self.inner.call_hook(LifecycleHook::Mounted);
        Ok(())
    }

    /// Shallow-merge `partial` into the state, then render.
    pub fn set_state(&self, partial: StateMap) -> Result<()> {
        self.ensure_alive()?;
        self.inner.state.merge(partial);
        self.rerender();
        Ok(())
    }

    /// Detach the root element and run the destroy hooks. Calling it again
    /// does nothing.
    pub fn destroy(&self) {
        let inner = &self.inner;
        if inner.phase.get().is_destroyed() {
            return;
        }

        inner.call_hook(LifecycleHook::BeforeDestroy);
        inner.unbind_directives();
        inner.element.remove();
        inner.set_phase(Phase::Destroyed);
        inner.call_hook(LifecycleHook::Destroyed);
    }

    /// Call a method as if an event binding had fired, without an event.
    pub fn invoke(&self, name: &str) -> Result<()> {
        self.call_method(name, None)
    }

    /// Call a method with `event`, as a DOM listener would.
    pub fn invoke_with(&self, name: &str, event: &Event) -> Result<()> {
        self.call_method(name, Some(event))
    }

    fn call_method(&self, name: &str, event: Option<&Event>) -> Result<()> {
        self.ensure_alive()?;
        let method = self
            .inner
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownMethod {
                name: name.to_string(),
            })?;
        method(&self.inner.state, event);
        Ok(())
    }

    pub fn state(&self) -> &State {
        &self.inner.state
    }

    /// The persistent root element
    pub fn element(&self) -> &Node {
        &self.inner.element
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    /// Number of renders so far, including the one at construction
    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    /// Current markup inside the root element
    pub fn html(&self) -> String {
        self.inner.element.inner_html()
    }

    pub fn template(&self) -> &str {
        &self.inner.template
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.inner.phase.get().is_destroyed() {
            return Err(Error::Destroyed);
        }
        Ok(())
    }

    /// Force a render through the effect so the pass re-derives its
    /// dependencies.
    fn rerender(&self) {
        let effect = self.inner.effect.borrow().clone();
        if let Some(effect) = effect {
            effect.run();
        }
    }
}

impl ComponentInner {
    fn set_phase(&self, phase: Phase) {
        let previous = self.phase.replace(phase);
        if previous != phase {
            tracing::debug!(from = ?previous, to = ?phase, "component phase");
        }
    }

    fn call_hook(&self, hook: LifecycleHook) {
        let Some(callbacks) = self.hooks.get(&hook) else {
            return;
        };
        tracing::trace!(%hook, "lifecycle hook");
        for f in callbacks {
            f();
        }
    }

    fn unbind_directives(&self) {
        let bound = std::mem::take(&mut *self.bound.borrow_mut());
        unbind_directives(bound, &self.directives, &self.state);
    }

    /// Body of the render effect.
    fn render(&self) {
        self.call_hook(LifecycleHook::BeforeUpdate);
        self.unbind_directives();

        let markup = self.evaluator.evaluate(&self.template, &Scope::new(&self.state));
        self.element.set_inner_html(&markup);
        let renders = self.renders.get() + 1;
        self.renders.set(renders);
        tracing::debug!(renders, bytes = markup.len(), "component rendered");

        self.call_hook(LifecycleHook::Updated);

        bind_events(&self.element, &self.methods, &self.state);
        let bound = apply_directives(&self.element, &self.directives, &self.state, renders > 1);
        *self.bound.borrow_mut() = bound;

        self.mount_children();
    }

    /// Mount each child into the first placeholder carrying its name.
    fn mount_children(&self) {
        if self.children.is_empty() {
            return;
        }
        let placeholders: Vec<Node> = self
            .element
            .descendants()
            .into_iter()
            .filter(|node| node.has_attribute(PLACEHOLDER_ATTR))
            .collect();

        for (name, child) in &self.children {
            let Some(container) = placeholders
                .iter()
                .find(|node| node.get_attribute(PLACEHOLDER_ATTR).as_deref() == Some(name.as_str()))
            else {
                continue;
            };
            if let Err(err) = child.mount(container) {
                tracing::warn!(child = %name, %err, "child mount failed");
            }
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("phase", &self.inner.phase.get())
            .field("renders", &self.inner.renders.get())
            .field("state", &self.inner.state)
            .field("children", &self.inner.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
