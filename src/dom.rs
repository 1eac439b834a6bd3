use std::borrow::Cow;
use std::fmt;

/// Boxed event callback as handed to the host DOM.
pub type Listener<Ev> = Box<dyn FnMut(&Ev)>;

/// The host document-object-model layer the builder drives.
///
/// Implementations pass their own failures back unchanged; the builder never
/// inspects or retries them.
pub trait Dom {
    /// Handle to an element node.
    type Node: Clone + fmt::Debug;
    /// Event value passed to listeners.
    type Event;
    type Error: std::error::Error + 'static;

    /// Creates a detached element with the given tag.
    fn create_element(&self, tag: &str) -> Result<Self::Node, Self::Error>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Creates a text node and appends it to `parent`.
    fn append_text(&self, parent: &Self::Node, text: &str) -> Result<(), Self::Error>;

    /// Removes the oldest child of `node`. Returns `false` if it had none.
    fn remove_first_child(&self, node: &Self::Node) -> Result<bool, Self::Error>;

    fn set_class_name(&self, node: &Self::Node, name: &str) -> Result<(), Self::Error>;

    fn set_attribute(&self, node: &Self::Node, key: &str, value: &str) -> Result<(), Self::Error>;

    fn set_style_property(&self, node: &Self::Node, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Sets the `value` property (form controls), not the attribute.
    fn set_value(&self, node: &Self::Node, value: &str) -> Result<(), Self::Error>;

    /// Registers `listener` for `event`. Nothing ever unregisters it.
    fn add_event_listener(
        &self,
        node: &Self::Node,
        event: &str,
        listener: Listener<Self::Event>,
    ) -> Result<(), Self::Error>;
}

/// CSS property name for a style key given either way, so `backgroundColor`
/// and `background-color` address the same declaration. Custom properties
/// (`--x`) are left alone.
pub fn css_property_name(key: &str) -> Cow<'_, str> {
    if key.starts_with("--") || !key.chars().any(|c| c.is_ascii_uppercase()) {
        return Cow::Borrowed(key);
    }
    if key == "cssFloat" {
        return Cow::Borrowed("float");
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn style_keys_become_css_names() {
        assert_eq!(css_property_name("backgroundColor"), "background-color");
        assert_eq!(css_property_name("background-color"), "background-color");
        assert_eq!(css_property_name("WebkitTransform"), "-webkit-transform");
        assert_eq!(css_property_name("cssFloat"), "float");
        assert_eq!(css_property_name("--accentColor"), "--accentColor");
    }
}
