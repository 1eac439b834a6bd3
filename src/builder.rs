use tracing::{debug, trace, warn};

use crate::context::{Context, Target};
use crate::dom::Dom;
use crate::errors::{BuildError, Result};

/// Chainable DOM builder addressing either a bound main node or the most
/// recently spawned element.
///
/// Operations that touch the DOM return `Result<&mut Self, _>` so chains read
/// `b.spawn("li")?.to_spawned().append_text("x")?`.
pub struct FluentDom<D: Dom> {
    dom: D,
    ctx: Context<D::Node>,
}

impl<D: Dom> FluentDom<D> {
    pub fn new(dom: D) -> Self {
        Self { dom, ctx: Context::new() }
    }

    /// Builder with `node` already bound as main node.
    pub fn with_node(dom: D, node: D::Node) -> Self {
        let mut builder = Self::new(dom);
        builder.bind(node);
        builder
    }

    pub fn dom(&self) -> &D { &self.dom }

    pub fn main_node(&self) -> Option<&D::Node> { self.ctx.main() }

    pub fn last_spawned(&self) -> Option<&D::Node> { self.ctx.last_spawned() }

    pub fn spawned_len(&self) -> usize { self.ctx.spawned().len() }

    pub fn target(&self) -> Target { self.ctx.target() }

    /// Creates a detached element without touching the spawn stack.
    pub fn create(&self, tag: &str) -> Result<D::Node, D::Error> {
        self.dom.create_element(tag).map_err(BuildError::Dom)
    }

    pub fn bind(&mut self, node: D::Node) -> &mut Self {
        debug!(?node, "bind main node");
        self.ctx.bind(node);
        self
    }

    /// Address the last spawned element from now on.
    pub fn to_spawned(&mut self) -> &mut Self {
        self.ctx.set_target(Target::Spawned);
        self
    }

    /// Address the main node from now on.
    pub fn to_main(&mut self) -> &mut Self {
        self.ctx.set_target(Target::Main);
        self
    }

    /// Creates a detached `<tag>` element and pushes it on the spawn stack.
    pub fn spawn(&mut self, tag: &str) -> Result<&mut Self, D::Error> {
        let node = self.create(tag)?;
        debug!(tag, depth = self.ctx.spawned().len() + 1, "spawn");
        self.ctx.push(node);
        Ok(self)
    }

    pub fn append_child(&mut self, child: D::Node) -> Result<&mut Self, D::Error> {
        self.apply("append_child", |dom, node| dom.append_child(node, &child))
    }

    /// Pops the last spawned element and appends it to the receiver.
    ///
    /// The pop happens before the receiver is resolved, so in spawned mode the
    /// parent is the element spawned just before the child. On failure the
    /// child goes back on the stack.
    pub fn append_spawned(&mut self) -> Result<&mut Self, D::Error> {
        let Some(child) = self.ctx.pop() else {
            warn!("append_spawned with empty spawn stack");
            return Err(BuildError::EmptySpawnStack);
        };
        let target = self.ctx.target();
        let Some(parent) = self.ctx.resolve() else {
            warn!(%target, "append_spawned has no parent to append to");
            self.ctx.push(child);
            return Err(BuildError::Unresolved { target });
        };
        debug!(%target, ?parent, ?child, "append spawned");
        if let Err(e) = self.dom.append_child(parent, &child) {
            self.ctx.push(child);
            return Err(BuildError::Dom(e));
        }
        Ok(self)
    }

    pub fn append_text(&mut self, text: &str) -> Result<&mut Self, D::Error> {
        self.apply("append_text", |dom, node| dom.append_text(node, text))
    }

    /// Empties the main node, whatever the current target.
    pub fn remove_children(&mut self) -> Result<&mut Self, D::Error> {
        let Some(main) = self.ctx.main().cloned() else {
            warn!("remove_children without a main node");
            return Err(BuildError::Unresolved { target: Target::Main });
        };
        self.remove_children_of(&main)
    }

    /// Removes every child of `node`, oldest first.
    pub fn remove_children_of(&mut self, node: &D::Node) -> Result<&mut Self, D::Error> {
        let mut removed = 0usize;
        while self.dom.remove_first_child(node).map_err(BuildError::Dom)? {
            removed += 1;
        }
        debug!(?node, removed, "remove children");
        Ok(self)
    }

    pub fn set_class(&mut self, name: &str) -> Result<&mut Self, D::Error> {
        self.apply("set_class", |dom, node| dom.set_class_name(node, name))
    }

    pub fn set_attr(&mut self, key: &str, value: &str) -> Result<&mut Self, D::Error> {
        self.apply("set_attr", |dom, node| dom.set_attribute(node, key, value))
    }

    pub fn set_style(&mut self, key: &str, value: &str) -> Result<&mut Self, D::Error> {
        self.apply("set_style", |dom, node| dom.set_style_property(node, key, value))
    }

    pub fn set_value(&mut self, value: &str) -> Result<&mut Self, D::Error> {
        self.apply("set_value", |dom, node| dom.set_value(node, value))
    }

    /// Registers `callback` for `event` on the receiver. The builder never
    /// removes it.
    pub fn on<F>(&mut self, event: &str, callback: F) -> Result<&mut Self, D::Error>
    where
        F: FnMut(&D::Event) + 'static,
    {
        self.apply("on", |dom, node| dom.add_event_listener(node, event, Box::new(callback)))
    }

    /// Calls `f(builder, item, index, items)` for each item, stopping at the
    /// first error.
    pub fn for_each<T, F>(&mut self, items: &[T], mut f: F) -> Result<&mut Self, D::Error>
    where
        F: FnMut(&mut Self, &T, usize, &[T]) -> Result<(), D::Error>,
    {
        for (index, item) in items.iter().enumerate() {
            f(&mut *self, item, index, items)?;
        }
        Ok(self)
    }

    /// Calls `f(builder, value, key, mapping, index)` in the mapping's own
    /// iteration order.
    pub fn for_each_of<'m, M, K, V, F>(&mut self, mapping: &'m M, mut f: F) -> Result<&mut Self, D::Error>
    where
        &'m M: IntoIterator<Item = (&'m K, &'m V)>,
        K: 'm,
        V: 'm,
        F: FnMut(&mut Self, &V, &K, &M, usize) -> Result<(), D::Error>,
    {
        for (index, (key, value)) in mapping.into_iter().enumerate() {
            f(&mut *self, value, key, mapping, index)?;
        }
        Ok(self)
    }

    pub fn call_if<F>(&mut self, condition: bool, on_true: F) -> Result<&mut Self, D::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), D::Error>,
    {
        if condition {
            on_true(&mut *self)?;
        }
        Ok(self)
    }

    pub fn call_unless<F>(&mut self, condition: bool, on_false: F) -> Result<&mut Self, D::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), D::Error>,
    {
        if !condition {
            on_false(&mut *self)?;
        }
        Ok(self)
    }

    pub fn call_if_else<F, G>(&mut self, condition: bool, on_true: F, on_false: G) -> Result<&mut Self, D::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), D::Error>,
        G: FnOnce(&mut Self) -> Result<(), D::Error>,
    {
        if condition {
            on_true(&mut *self)?;
        } else {
            on_false(&mut *self)?;
        }
        Ok(self)
    }

    /// Drops the main node and all spawned elements and returns to main mode.
    pub fn clear(&mut self) -> &mut Self {
        debug!(dropped = self.ctx.spawned().len(), "clear");
        self.ctx.clear();
        self
    }

    fn apply<F>(&mut self, op: &'static str, f: F) -> Result<&mut Self, D::Error>
    where
        F: FnOnce(&D, &D::Node) -> std::result::Result<(), D::Error>,
    {
        let target = self.ctx.target();
        let Some(node) = self.ctx.resolve() else {
            warn!(op, %target, "no receiver");
            return Err(BuildError::Unresolved { target });
        };
        trace!(op, %target, ?node, "resolved receiver");
        f(&self.dom, node).map_err(BuildError::Dom)?;
        Ok(self)
    }
}
