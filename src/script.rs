//! Replay scripts: a JSON list of builder operations executed in order.
//!
//! ```json
//! [
//!   {"op": "spawn", "tag": "ul"},
//!   {"op": "to_spawned"},
//!   {"op": "for_each", "items": ["a", "b"], "body": [
//!     {"op": "spawn", "tag": "li"},
//!     {"op": "append_text", "text": "{index}: {item}"},
//!     {"op": "append_spawned"}
//!   ]},
//!   {"op": "to_main"},
//!   {"op": "append_spawned"}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::builder::FluentDom;
use crate::dom::Dom;
use crate::errors::{BuildError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Spawn { tag: String },
    ToSpawned,
    ToMain,
    AppendSpawned,
    AppendText { text: String },
    RemoveChildren,
    SetClass { name: String },
    SetAttr { key: String, value: String },
    SetStyle { key: String, value: String },
    SetValue { value: String },
    /// Registers a listener that logs the event when it fires.
    On { event: String },
    Clear,
    /// Runs `body` once per item; `{item}` and `{index}` in string fields
    /// are replaced.
    ForEach { items: Vec<Value>, body: Vec<Op> },
    CallIf {
        condition: bool,
        #[serde(default)]
        then: Vec<Op>,
        #[serde(default)]
        otherwise: Vec<Op>,
    },
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Spawn { .. } => "spawn",
            Op::ToSpawned => "to_spawned",
            Op::ToMain => "to_main",
            Op::AppendSpawned => "append_spawned",
            Op::AppendText { .. } => "append_text",
            Op::RemoveChildren => "remove_children",
            Op::SetClass { .. } => "set_class",
            Op::SetAttr { .. } => "set_attr",
            Op::SetStyle { .. } => "set_style",
            Op::SetValue { .. } => "set_value",
            Op::On { .. } => "on",
            Op::Clear => "clear",
            Op::ForEach { .. } => "for_each",
            Op::CallIf { .. } => "call_if",
        }
    }

    /// Copy of this op with `{item}`/`{index}` filled in. `call_if` branches
    /// are filled too; a nested `for_each` body keeps its placeholders for its
    /// own items.
    fn substitute(&self, item: &str, index: usize) -> Op {
        let fill = |s: &String| fill_placeholders(s, item, index);
        let fill_all = |ops: &[Op]| -> Vec<Op> { ops.iter().map(|op| op.substitute(item, index)).collect() };
        match self {
            Op::Spawn { tag } => Op::Spawn { tag: fill(tag) },
            Op::AppendText { text } => Op::AppendText { text: fill(text) },
            Op::SetClass { name } => Op::SetClass { name: fill(name) },
            Op::SetAttr { key, value } => Op::SetAttr { key: fill(key), value: fill(value) },
            Op::SetStyle { key, value } => Op::SetStyle { key: fill(key), value: fill(value) },
            Op::SetValue { value } => Op::SetValue { value: fill(value) },
            Op::On { event } => Op::On { event: fill(event) },
            Op::ForEach { .. } => self.clone(),
            Op::CallIf { condition, then, otherwise } => Op::CallIf {
                condition: *condition,
                then: fill_all(then),
                otherwise: fill_all(otherwise),
            },
            other => other.clone(),
        }
    }
}

/// Single left-to-right pass, so substituted text is never scanned again.
fn fill_placeholders(template: &str, item: &str, index: usize) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{item}") {
            out.push_str(item);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{index}") {
            out.push_str(&index.to_string());
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Error)]
pub enum ScriptError<E: std::error::Error + 'static> {
    #[error("op #{index} ({op}) failed: {source}")]
    Op {
        index: usize,
        op: &'static str,
        source: BuildError<E>,
    },
}

impl<E: std::error::Error + 'static> ScriptError<E> {
    pub fn index(&self) -> usize {
        match self {
            ScriptError::Op { index, .. } => *index,
        }
    }

    pub fn build_error(&self) -> &BuildError<E> {
        match self {
            ScriptError::Op { source, .. } => source,
        }
    }
}

pub fn parse(src: &str) -> serde_json::Result<Vec<Op>> {
    serde_json::from_str(src)
}

/// Executes `ops` against `builder`, stopping at the first failure.
pub fn replay<D: Dom>(builder: &mut FluentDom<D>, ops: &[Op]) -> std::result::Result<(), ScriptError<D::Error>> {
    for (index, op) in ops.iter().enumerate() {
        debug!(index, op = op.name(), "replay");
        apply(builder, op).map_err(|source| ScriptError::Op { index, op: op.name(), source })?;
    }
    Ok(())
}

fn apply_all<D: Dom>(builder: &mut FluentDom<D>, ops: &[Op]) -> Result<(), D::Error> {
    ops.iter().try_for_each(|op| apply(builder, op))
}

fn apply<D: Dom>(builder: &mut FluentDom<D>, op: &Op) -> Result<(), D::Error> {
    match op {
        Op::Spawn { tag } => {
            builder.spawn(tag)?;
        }
        Op::ToSpawned => {
            builder.to_spawned();
        }
        Op::ToMain => {
            builder.to_main();
        }
        Op::AppendSpawned => {
            builder.append_spawned()?;
        }
        Op::AppendText { text } => {
            builder.append_text(text)?;
        }
        Op::RemoveChildren => {
            builder.remove_children()?;
        }
        Op::SetClass { name } => {
            builder.set_class(name)?;
        }
        Op::SetAttr { key, value } => {
            builder.set_attr(key, value)?;
        }
        Op::SetStyle { key, value } => {
            builder.set_style(key, value)?;
        }
        Op::SetValue { value } => {
            builder.set_value(value)?;
        }
        Op::On { event } => {
            let name = event.clone();
            builder.on(event, move |_| info!(event = %name, "event fired"))?;
        }
        Op::Clear => {
            builder.clear();
        }
        Op::ForEach { items, body } => {
            builder.for_each(items, |b, item, index, _| {
                let item = match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                body.iter().try_for_each(|op| apply(b, &op.substitute(&item, index)))
            })?;
        }
        Op::CallIf { condition, then, otherwise } => {
            builder.call_if_else(*condition, |b| apply_all(b, then), |b| apply_all(b, otherwise))?;
        }
    }
    Ok(())
}
