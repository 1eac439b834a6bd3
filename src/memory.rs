//! In-memory host DOM.
//!
//! An arena of element and text nodes behind a shared handle, enough DOM
//! behavior for the builder to be driven and inspected outside a browser:
//! name checks, node moves on re-append, hierarchy checks, style declarations
//! kept inside the `style` attribute, and listeners that can be dispatched by
//! hand. Events do not bubble.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use thiserror::Error;
use tracing::trace;

use crate::dom::{css_property_name, Dom, Listener};

/// Elements that never get a closing tag when serialized.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Handle to a node inside one [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Event handed to listeners by [`MemoryDom::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
    pub target: NodeId,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid character in name {0:?}")]
    InvalidCharacter(String),
    #[error("cannot insert {child:?} into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    #[error("node {0:?} does not belong to this document")]
    NotFound(NodeId),
}

enum Kind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        value: Option<String>,
    },
    Text(String),
}

struct NodeData {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<(String, Listener<Event>)>,
}

#[derive(Default)]
struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    fn insert(&mut self, kind: Kind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData { kind, parent: None, children: Vec::new(), listeners: Vec::new() });
        id
    }

    fn get(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(id.0).ok_or(DomError::NotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::NotFound(id))
    }

    fn attrs_mut(&mut self, id: NodeId) -> Result<&mut Vec<(String, String)>, DomError> {
        match &mut self.get_mut(id)?.kind {
            Kind::Element { attrs, .. } => Ok(attrs),
            Kind::Text(_) => Err(DomError::NotFound(id)),
        }
    }

    fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.get_mut(id)?.parent.take() {
            self.get_mut(parent)?.children.retain(|c| *c != id);
        }
        Ok(())
    }

    /// `ancestor` is `node` itself or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let is_text = matches!(self.get(parent)?.kind, Kind::Text(_));
        self.get(child)?;
        if is_text || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.detach(child)?;
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else { return };
        match &node.kind {
            Kind::Text(text) => out.push_str(&escape_text(text)),
            Kind::Element { tag, attrs, .. } => {
                out.push('<');
                out.push_str(tag);
                for (k, v) in attrs {
                    out.push_str(&format!(" {k}=\"{}\"", escape_attr(v)));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }

    fn write_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else { return };
        match &node.kind {
            Kind::Text(text) => out.push_str(text),
            Kind::Element { .. } => node.children.iter().for_each(|c| self.write_text(*c, out)),
        }
    }
}

/// Shared handle to an in-memory document. Clones see the same tree.
#[derive(Clone, Default)]
pub struct MemoryDom {
    tree: Rc<RefCell<Tree>>,
}

impl fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDom").field("nodes", &self.tree.borrow().nodes.len()).finish()
    }
}

impl MemoryDom {
    pub fn new() -> Self { Self::default() }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize { self.tree.borrow().nodes.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// `None` for text nodes and unknown ids.
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        match &self.tree.borrow().get(id).ok()?.kind {
            Kind::Element { tag, .. } => Some(tag.clone()),
            Kind::Text(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.tree.borrow().get(id).map(|n| matches!(n.kind, Kind::Text(_))), Ok(true))
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<String> {
        match &self.tree.borrow().get(id).ok()?.kind {
            Kind::Element { attrs, .. } => {
                let key = key.to_ascii_lowercase();
                attrs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
            }
            Kind::Text(_) => None,
        }
    }

    pub fn style_property(&self, id: NodeId, key: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        let key = css_property_name(key);
        parse_style(&style).into_iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// The `value` property, as set through [`Dom::set_value`].
    pub fn value(&self, id: NodeId) -> Option<String> {
        match &self.tree.borrow().get(id).ok()?.kind {
            Kind::Element { value, .. } => value.clone(),
            Kind::Text(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.borrow().get(id).map(|n| n.children.clone()).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.borrow().get(id).ok()?.parent
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.tree.borrow().write_text(id, &mut out);
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.tree.borrow().write_html(id, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        if let Ok(node) = tree.get(id) {
            for child in &node.children {
                tree.write_html(*child, &mut out);
            }
        }
        out
    }

    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.tree
            .borrow()
            .get(id)
            .map(|n| n.listeners.iter().filter(|(name, _)| name == event).count())
            .unwrap_or(0)
    }

    /// Runs the listeners registered on `target` for `event`, in registration
    /// order, and returns how many ran.
    ///
    /// Listeners may hold their own clone of this `MemoryDom` and mutate it.
    pub fn dispatch(&self, target: NodeId, event: &str) -> Result<usize, DomError> {
        let mut listeners = std::mem::take(&mut self.tree.borrow_mut().get_mut(target)?.listeners);
        let ev = Event { kind: event.to_string(), target };
        let mut fired = 0;
        for (_, listener) in listeners.iter_mut().filter(|(name, _)| name == event) {
            listener(&ev);
            fired += 1;
        }
        let mut tree = self.tree.borrow_mut();
        let slot = &mut tree.get_mut(target)?.listeners;
        listeners.append(slot);
        *slot = listeners;
        trace!(?target, event, fired, "dispatch");
        Ok(fired)
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;
    type Event = Event;
    type Error = DomError;

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        check_name(tag)?;
        let kind = Kind::Element { tag: tag.to_ascii_lowercase(), attrs: Vec::new(), value: None };
        Ok(self.tree.borrow_mut().insert(kind))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.tree.borrow_mut().append(*parent, *child)
    }

    fn append_text(&self, parent: &NodeId, text: &str) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        tree.get(*parent)?;
        let node = tree.insert(Kind::Text(text.to_string()));
        tree.append(*parent, node)
    }

    fn remove_first_child(&self, node: &NodeId) -> Result<bool, DomError> {
        let mut tree = self.tree.borrow_mut();
        match tree.get(*node)?.children.first().copied() {
            Some(first) => {
                tree.detach(first)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_class_name(&self, node: &NodeId, name: &str) -> Result<(), DomError> {
        self.set_attribute(node, "class", name)
    }

    fn set_attribute(&self, node: &NodeId, key: &str, value: &str) -> Result<(), DomError> {
        check_name(key)?;
        let key = key.to_ascii_lowercase();
        let mut tree = self.tree.borrow_mut();
        let attrs = tree.attrs_mut(*node)?;
        match attrs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((key, value.to_string())),
        }
        Ok(())
    }

    fn set_style_property(&self, node: &NodeId, key: &str, value: &str) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let attrs = tree.attrs_mut(*node)?;
        let current = attrs.iter().find(|(k, _)| k == "style").map(|(_, v)| v.as_str()).unwrap_or("");
        let mut decls = parse_style(current);
        let key = css_property_name(key);
        let value = value.trim();
        match decls.iter().position(|(k, _)| *k == key) {
            Some(i) if value.is_empty() => {
                decls.remove(i);
            }
            Some(i) => decls[i].1 = value.to_string(),
            None if value.is_empty() => {}
            None => decls.push((key.into_owned(), value.to_string())),
        }
        let style = decls.iter().map(|(k, v)| format!("{k}: {v};")).join(" ");
        match attrs.iter_mut().find(|(k, _)| k == "style") {
            Some((_, v)) => *v = style,
            None => attrs.push(("style".to_string(), style)),
        }
        Ok(())
    }

    fn set_value(&self, node: &NodeId, text: &str) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        match &mut tree.get_mut(*node)?.kind {
            Kind::Element { value, .. } => {
                *value = Some(text.to_string());
                Ok(())
            }
            Kind::Text(_) => Err(DomError::NotFound(*node)),
        }
    }

    fn add_event_listener(&self, node: &NodeId, event: &str, listener: Listener<Event>) -> Result<(), DomError> {
        self.tree.borrow_mut().get_mut(*node)?.listeners.push((event.to_string(), listener));
        Ok(())
    }
}

fn check_name(name: &str) -> Result<(), DomError> {
    let bad = |c: char| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '=' | '"' | '\'' | '\0');
    if name.is_empty() || name.chars().any(bad) {
        return Err(DomError::InvalidCharacter(name.to_string()));
    }
    Ok(())
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_nested_markup() {
        let dom = MemoryDom::new();
        let div = dom.create_element("DIV").unwrap();
        let br = dom.create_element("br").unwrap();
        dom.set_attribute(&div, "title", "a \"quoted\" & b").unwrap();
        dom.append_text(&div, "1 < 2").unwrap();
        dom.append_child(&div, &br).unwrap();

        assert_eq!(dom.outer_html(div), r#"<div title="a &quot;quoted&quot; &amp; b">1 &lt; 2<br></div>"#);
        assert_eq!(dom.text_content(div), "1 < 2");
    }

    #[test]
    fn rejects_bad_names() {
        let dom = MemoryDom::new();
        assert_eq!(dom.create_element(""), Err(DomError::InvalidCharacter(String::new())));
        assert!(dom.create_element("not ok").is_err());
        let p = dom.create_element("p").unwrap();
        assert!(dom.set_attribute(&p, "a=b", "x").is_err());
    }

    #[test]
    fn append_moves_and_refuses_cycles() {
        let dom = MemoryDom::new();
        let a = dom.create_element("a").unwrap();
        let b = dom.create_element("b").unwrap();
        let c = dom.create_element("c").unwrap();
        dom.append_child(&a, &c).unwrap();
        dom.append_child(&b, &c).unwrap();
        assert_eq!(dom.children(a), vec![]);
        assert_eq!(dom.parent(c), Some(b));

        dom.append_child(&c, &a).unwrap();
        assert_eq!(dom.append_child(&a, &b), Err(DomError::HierarchyRequest { parent: a, child: b }));
        assert!(dom.append_child(&a, &a).is_err());
    }

    #[test]
    fn style_declarations_live_in_the_attribute() {
        let dom = MemoryDom::new();
        let p = dom.create_element("p").unwrap();
        dom.set_style_property(&p, "color", "red").unwrap();
        dom.set_style_property(&p, "margin", "0").unwrap();
        dom.set_style_property(&p, "color", "blue").unwrap();
        assert_eq!(dom.attribute(p, "style").as_deref(), Some("color: blue; margin: 0;"));

        dom.set_style_property(&p, "color", "").unwrap();
        assert_eq!(dom.style_property(p, "margin").as_deref(), Some("0"));
        assert_eq!(dom.style_property(p, "color"), None);
    }

    #[test]
    fn style_keys_in_script_form_share_the_declaration() {
        let dom = MemoryDom::new();
        let p = dom.create_element("p").unwrap();
        dom.set_style_property(&p, "backgroundColor", "red").unwrap();
        dom.set_style_property(&p, "background-color", "blue").unwrap();
        assert_eq!(dom.attribute(p, "style").as_deref(), Some("background-color: blue;"));
        assert_eq!(dom.style_property(p, "backgroundColor").as_deref(), Some("blue"));

        dom.set_style_property(&p, "backgroundColor", "").unwrap();
        assert_eq!(dom.attribute(p, "style").as_deref(), Some(""));
    }

    #[test]
    fn dispatch_runs_matching_listeners_in_order() {
        let dom = MemoryDom::new();
        let button = dom.create_element("button").unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = log.clone();
            dom.add_event_listener(&button, "click", Box::new(move |ev: &Event| log.borrow_mut().push((tag, ev.kind.clone()))))
                .unwrap();
        }
        let inner = dom.clone();
        dom.add_event_listener(&button, "focus", Box::new(move |ev: &Event| {
            inner.append_text(&ev.target, "focused").unwrap();
        }))
        .unwrap();

        assert_eq!(dom.dispatch(button, "click").unwrap(), 2);
        assert_eq!(dom.dispatch(button, "focus").unwrap(), 1);
        assert_eq!(dom.dispatch(button, "blur").unwrap(), 0);
        assert_eq!(*log.borrow(), vec![("first", "click".to_string()), ("second", "click".to_string())]);
        assert_eq!(dom.text_content(button), "focused");
        assert_eq!(dom.listener_count(button, "click"), 2);
    }
}
