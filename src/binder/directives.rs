// ============================================================================
// spark-components - Custom Directives
// `v-<name>="value"` attributes driving bind / update / unbind hooks
// ============================================================================

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::constants::DIRECTIVE_PREFIX;
use crate::dom::Node;
use crate::reactivity::State;

/// What a directive hook can see besides its element and value
pub struct DirectiveContext<'a> {
    pub state: &'a State,
}

/// One directive hook: (element, attribute value, context)
pub type DirectiveHook = Rc<dyn Fn(&Node, &str, &DirectiveContext<'_>)>;

/// A named behavior attached to elements carrying `v-<name>`.
///
/// Every hook is optional. `bind` runs on each render that contains the
/// marker, `update` additionally on every render after the first, and
/// `unbind` before the element is thrown away.
///
/// ```
/// use spark_components::binder::Directive;
///
/// let focus = Directive::new().on_bind(|el, _, _| el.set_attribute("autofocus", ""));
/// assert!(focus.has_bind());
/// ```
#[derive(Clone, Default)]
pub struct Directive {
    bind: Option<DirectiveHook>,
    update: Option<DirectiveHook>,
    unbind: Option<DirectiveHook>,
}

impl Directive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_bind<F>(mut self, f: F) -> Self
    where
        F: Fn(&Node, &str, &DirectiveContext<'_>) + 'static,
    {
        self.bind = Some(Rc::new(f));
        self
    }

    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Node, &str, &DirectiveContext<'_>) + 'static,
    {
        self.update = Some(Rc::new(f));
        self
    }

    pub fn on_unbind<F>(mut self, f: F) -> Self
    where
        F: Fn(&Node, &str, &DirectiveContext<'_>) + 'static,
    {
        self.unbind = Some(Rc::new(f));
        self
    }

    pub fn has_bind(&self) -> bool {
        self.bind.is_some()
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("bind", &self.bind.is_some())
            .field("update", &self.update.is_some())
            .field("unbind", &self.unbind.is_some())
            .finish()
    }
}

/// Directives by name, in registration order
pub type Directives = IndexMap<String, Directive>;

/// An element a directive was bound to during the last render
#[derive(Debug, Clone)]
pub struct BoundDirective {
    pub name: String,
    pub element: Node,
    pub value: String,
}

/// Run every registered directive over the elements under `root`.
///
/// Directives apply in registration order, elements in document order. The
/// marker attribute is stripped once its hooks have run.
pub fn apply_directives(
    root: &Node,
    directives: &Directives,
    state: &State,
    rerender: bool,
) -> Vec<BoundDirective> {
    let elements: Vec<Node> = root
        .descendants()
        .into_iter()
        .filter(Node::is_element)
        .collect();
    let ctx = DirectiveContext { state };
    let mut bound = Vec::new();

    for (name, directive) in directives {
        let attribute = format!("{DIRECTIVE_PREFIX}{name}");
        for element in &elements {
            let Some(value) = element.get_attribute(&attribute) else {
                continue;
            };
            if let Some(bind) = &directive.bind {
                bind(element, &value, &ctx);
            }
            if rerender {
                if let Some(update) = &directive.update {
                    update(element, &value, &ctx);
                }
            }
            element.remove_attribute(&attribute);
            bound.push(BoundDirective {
                name: name.clone(),
                element: element.clone(),
                value,
            });
        }
    }

    if !bound.is_empty() {
        tracing::trace!(count = bound.len(), "directives bound");
    }
    bound
}

/// Call `unbind` for everything bound by a previous [`apply_directives`].
pub fn unbind_directives(bound: Vec<BoundDirective>, directives: &Directives, state: &State) {
    let ctx = DirectiveContext { state };
    for entry in bound {
        let Some(unbind) = directives.get(&entry.name).and_then(|d| d.unbind.as_ref()) else {
            continue;
        };
        unbind(&entry.element, &entry.value, &ctx);
    }
}
