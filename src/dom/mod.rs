// ============================================================================
// spark-components - DOM
// A small in-memory element tree: markup, selectors and events
// ============================================================================

pub mod document;
pub mod event;
pub mod node;
pub mod parse;
pub mod selector;

pub use document::Document;
pub use event::{Event, Listener};
pub use node::{is_void_element, Node, VOID_ELEMENTS};
pub use parse::parse_fragment;
pub use selector::{Combinator, ComplexSelector, CompoundSelector, Selector, SelectorPart};
