//! Chainable DOM construction with two addressing contexts: a bound main node
//! and a stack of spawned, not yet attached elements.
//!
//! The builder talks to the document through the [`Dom`] trait. [`MemoryDom`]
//! is an in-memory document for tests and the `fdom` replay tool; with the
//! `web` feature, `web::WebDom` drives a real browser document.

pub mod errors;
pub mod context;
pub mod dom;
pub mod builder;
pub mod memory;
pub mod script;
#[cfg(feature = "web")]
pub mod web;

pub use builder::FluentDom;
pub use context::{Context, Target};
pub use dom::{Dom, Listener};
pub use errors::{BuildError, Result};
pub use memory::{DomError, Event, MemoryDom, NodeId};
pub use script::{Op, ScriptError};

/// Builder over a fresh in-memory document with a `<root_tag>` element bound
/// as main node.
pub fn memory_builder(root_tag: &str) -> std::result::Result<(FluentDom<MemoryDom>, NodeId), DomError> {
    let dom = MemoryDom::new();
    let root = dom.create_element(root_tag)?;
    Ok((FluentDom::with_node(dom, root), root))
}
