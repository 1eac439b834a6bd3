use std::fmt;

/// Which node single-target operations address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Target {
    /// The externally bound main node.
    #[default]
    Main,
    /// The top of the spawn stack.
    Spawned,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Main => f.write_str("main"),
            Target::Spawned => f.write_str("spawned"),
        }
    }
}

/// Addressing state of a builder: the main node, the spawn stack and the
/// current target.
#[derive(Debug, Clone)]
pub struct Context<N> {
    main: Option<N>,
    spawned: Vec<N>,
    target: Target,
}

impl<N> Default for Context<N> {
    fn default() -> Self {
        Self { main: None, spawned: Vec::new(), target: Target::Main }
    }
}

impl<N> Context<N> {
    pub fn new() -> Self { Self::default() }

    pub fn main(&self) -> Option<&N> { self.main.as_ref() }

    pub fn target(&self) -> Target { self.target }

    pub fn spawned(&self) -> &[N] { &self.spawned }

    pub fn last_spawned(&self) -> Option<&N> { self.spawned.last() }

    pub fn bind(&mut self, node: N) { self.main = Some(node); }

    pub fn set_target(&mut self, target: Target) { self.target = target; }

    pub fn push(&mut self, node: N) { self.spawned.push(node); }

    pub fn pop(&mut self) -> Option<N> { self.spawned.pop() }

    /// The node the current target points at, if any.
    ///
    /// Every context-addressed operation goes through here.
    pub fn resolve(&self) -> Option<&N> {
        match self.target {
            Target::Main => self.main.as_ref(),
            Target::Spawned => self.spawned.last(),
        }
    }

    /// Back to the freshly created state.
    pub fn clear(&mut self) {
        self.main = None;
        self.spawned.clear();
        self.target = Target::Main;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_by_target() {
        let mut ctx = Context::new();
        assert_eq!(ctx.resolve(), None);

        ctx.bind("root");
        ctx.push("a");
        ctx.push("b");
        assert_eq!(ctx.resolve(), Some(&"root"));

        ctx.set_target(Target::Spawned);
        assert_eq!(ctx.resolve(), Some(&"b"));

        ctx.pop();
        assert_eq!(ctx.resolve(), Some(&"a"));
        ctx.pop();
        assert_eq!(ctx.resolve(), None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut ctx = Context::new();
        ctx.bind(1);
        ctx.push(2);
        ctx.set_target(Target::Spawned);
        ctx.clear();

        assert_eq!(ctx.main(), None);
        assert!(ctx.spawned().is_empty());
        assert_eq!(ctx.target(), Target::Main);
    }
}
