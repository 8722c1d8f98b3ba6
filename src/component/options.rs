// ============================================================================
// spark-components - Component Options
// Builder for everything a component is constructed from
// ============================================================================

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::controller::Component;
use super::lifecycle::{Hook, LifecycleHook};
use crate::binder::{Directive, Directives, Method, Methods};
use crate::core::ReactiveContext;
use crate::dom::{Document, Event};
use crate::reactivity::{State, StateMap};
use crate::router::Router;

/// Produces the initial state map
pub type DataFn = Box<dyn FnOnce() -> StateMap>;

/// Construction options for a [`Component`].
///
/// ```
/// use spark_components::{state, Component, ComponentOptions};
///
/// let counter = Component::new(
///     ComponentOptions::new("<p>{{ count }}</p>", || state!({ "count": 1 }))
///         .method("inc", |state, _| {
///             let next = state.peek("count").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
///             state.set("count", next);
///         }),
/// );
///
/// counter.invoke("inc").unwrap();
/// assert_eq!(counter.html(), "<p>2</p>");
/// ```
pub struct ComponentOptions {
    pub(crate) template: String,
    pub(crate) data: DataFn,
    pub(crate) methods: Methods,
    pub(crate) components: IndexMap<String, Component>,
    pub(crate) directives: Directives,
    pub(crate) hooks: FxHashMap<LifecycleHook, Vec<Hook>>,
    pub(crate) router: Option<Router>,
    pub(crate) context: Option<Rc<ReactiveContext>>,
    pub(crate) document: Option<Document>,
}

impl ComponentOptions {
    pub fn new<F>(template: impl Into<String>, data: F) -> Self
    where
        F: FnOnce() -> StateMap + 'static,
    {
        Self {
            template: template.into(),
            data: Box::new(data),
            methods: Methods::new(),
            components: IndexMap::new(),
            directives: Directives::new(),
            hooks: FxHashMap::default(),
            router: None,
            context: None,
            document: None,
        }
    }

    /// Register a method callable from `@event` bindings and
    /// [`Component::invoke`].
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&State, Option<&Event>) + 'static,
    {
        self.methods.insert(name.into(), Rc::new(f) as Method);
        self
    }

    /// Register a child, mounted wherever the template says `<name/>`.
    pub fn component(mut self, name: impl Into<String>, child: Component) -> Self {
        self.components.insert(name.into(), child);
        self
    }

    /// Register a directive, applied to elements carrying `v-<name>`.
    pub fn directive(mut self, name: impl Into<String>, directive: Directive) -> Self {
        self.directives.insert(name.into(), directive);
        self
    }

    /// The router whose outlet becomes this component's root element.
    pub fn router(mut self, router: &Router) -> Self {
        self.router = Some(router.clone());
        self
    }

    /// Share a tracking context with other components. Without one the
    /// component gets its own.
    pub fn context(mut self, ctx: &Rc<ReactiveContext>) -> Self {
        self.context = Some(ctx.clone());
        self
    }

    /// The document selectors passed to `mount` are resolved in.
    pub fn document(mut self, document: &Document) -> Self {
        self.document = Some(document.clone());
        self
    }

    /// Add a lifecycle callback. Several callbacks for one hook run in the
    /// order they were added.
    pub fn hook<F>(mut self, hook: LifecycleHook, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.hooks.entry(hook).or_default().push(Rc::new(f));
        self
    }

    pub fn before_create<F: Fn() + 'static>(self, f: F) -> Self {
        self.hook(LifecycleHook::BeforeCreate, f)
    }

    pub fn created<F: Fn() + 'static>(self, f: F) -> Self {
        self.hook(LifecycleHook::Created, f)
    }

    pub fn before_mount<F: Fn() + 'static>(self, f: F) -> Self {
        self.hook(LifecycleHook::BeforeMount, f)
    }

    pub fn mounted<F: Fn() + 'static>(self, f: F) -> Self {
        self.hook(LifecycleHook::Mounted, f)
    }

    pub fn before_update<F: Fn() + 'static>(self, f: F) -> Self {
        self.hook(LifecycleHook::BeforeUpdate, f)
    }

    pub fn updated<F: Fn() + 'static>(self, f: F) -> Self {
        self.hook(LifecycleHook::Updated, f)
    }

    pub fn before_destroy<F: Fn() + 'static>(self, f: F) -> Self {
        self.hook(LifecycleHook::BeforeDestroy, f)
    }

    pub fn destroyed<F: Fn() + 'static>(self, f: F) -> Self {
        self.hook(LifecycleHook::Destroyed, f)
    }
}

impl fmt::Debug for ComponentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentOptions")
            .field("template", &self.template)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("directives", &self.directives.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .field("router", &self.router.is_some())
            .finish()
    }
}
