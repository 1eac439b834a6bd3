//! Browser host DOM on top of `web-sys`.

use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use crate::dom::{css_property_name, Dom, Listener};

/// A JavaScript exception raised by a DOM call, rendered as text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("dom exception: {0}")]
pub struct WebError(pub String);

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the current window.
    pub fn from_window() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or_else(|| WebError("no window".into()))?;
        let document = window.document().ok_or_else(|| WebError("no document".into()))?;
        Ok(Self::new(document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Dom for WebDom {
    type Node = Element;
    type Event = web_sys::Event;
    type Error = WebError;

    fn create_element(&self, tag: &str) -> Result<Element, WebError> {
        Ok(self.document.create_element(tag)?)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), WebError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn append_text(&self, parent: &Element, text: &str) -> Result<(), WebError> {
        let node = self.document.create_text_node(text);
        parent.append_child(&node)?;
        Ok(())
    }

    fn remove_first_child(&self, node: &Element) -> Result<bool, WebError> {
        match node.first_child() {
            Some(child) => {
                node.remove_child(&child)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_class_name(&self, node: &Element, name: &str) -> Result<(), WebError> {
        node.set_class_name(name);
        Ok(())
    }

    fn set_attribute(&self, node: &Element, key: &str, value: &str) -> Result<(), WebError> {
        Ok(node.set_attribute(key, value)?)
    }

    /// Accepts script names (`backgroundColor`) as well as CSS names.
    fn set_style_property(&self, node: &Element, key: &str, value: &str) -> Result<(), WebError> {
        let Some(html) = node.dyn_ref::<HtmlElement>() else {
            return Err(WebError(format!("<{}> has no inline style", node.tag_name())));
        };
        Ok(html.style().set_property(&css_property_name(key), value)?)
    }

    fn set_value(&self, node: &Element, value: &str) -> Result<(), WebError> {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else {
            node.set_attribute("value", value)?;
        }
        Ok(())
    }

    fn add_event_listener(
        &self,
        node: &Element,
        event: &str,
        mut listener: Listener<web_sys::Event>,
    ) -> Result<(), WebError> {
        let closure = Closure::wrap(Box::new(move |ev: web_sys::Event| listener(&ev)) as Box<dyn FnMut(_)>);
        node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        // Listeners live as long as the page.
        closure.forget();
        Ok(())
    }
}
