//! Math post-processing hooks.
//!
//! The pass locates `$$…$$` spans and hands each one to the registered
//! hooks. A span opening at the start of a line is display math; any other
//! span is inline.

use crate::context::RenderContext;
use once_cell::sync::Lazy;
use pagepress_types::Diagnostic;
use regex::Regex;
use tracing::warn;

/// A single math span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathNode {
    pub body: String,
    pub display: bool,
}

/// Post-processing applied to each math node of a page.
pub trait MathHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, node: &mut MathNode, ctx: &mut RenderContext);
}

/// Runs hooks, in registration order, over every math span of a text.
#[derive(Default)]
pub struct MathPass {
    hooks: Vec<Box<dyn MathHook>>,
}

impl MathPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(mut self, hook: impl MathHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn apply(&self, text: &str, ctx: &mut RenderContext) -> String {
        if self.is_empty() || !text.contains("$$") {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last_end = 0;
        for caps in MATH_SPAN_RE.captures_iter(text) {
            let (Some(full), Some(body)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let mut node = MathNode {
                body: body.as_str().to_string(),
                display: starts_line(text, full.start()),
            };
            for hook in &self.hooks {
                hook.process(&mut node, ctx);
            }

            out.push_str(&text[last_end..full.start()]);
            out.push_str("$$");
            out.push_str(&node.body);
            out.push_str("$$");
            last_end = full.end();
        }
        out.push_str(&text[last_end..]);
        out
    }
}

fn starts_line(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .rev()
        .take_while(|c| *c != '\n')
        .all(|c| c == ' ' || c == '\t')
}

/// Wraps display math in an `equation` environment so the renderer numbers it.
///
/// Bodies that already open an `align`, `alignat`, `equation`, `gather` or
/// `multline` environment (starred or not) are left alone. `\label{…}` names
/// must be unique within a page.
#[derive(Debug, Default, Clone, Copy)]
pub struct EquationNumbering;

impl MathHook for EquationNumbering {
    fn name(&self) -> &'static str {
        "equation-numbering"
    }

    fn process(&self, node: &mut MathNode, ctx: &mut RenderContext) {
        if !node.display {
            return;
        }

        for caps in LABEL_RE.captures_iter(&node.body) {
            let label = &caps[1];
            if !ctx.register_label(label) {
                warn!("Duplicate equation label '{}'", label);
                ctx.report(
                    Diagnostic::warning(
                        "math.duplicate_label",
                        format!("Equation label '{}' is used more than once", label),
                    )
                    .with_context(caps[0].to_string()),
                );
            }
        }

        if !NUMBERED_ENV_RE.is_match(&node.body) {
            node.body = format!(
                "\n\\begin{{equation}}\n{}\n\\end{{equation}}\n",
                node.body.trim()
            );
        }
    }
}

/// Expands `\indices{^a_b…}` in the manner of the LaTeX `tensor` package.
///
/// Each index becomes a slot in both rows, with `\phantom` filling the row
/// it does not belong to: `T\indices{^\mu_\nu}` → `T^{\mu\phantom{\nu}}_{\phantom{\mu}\nu}`.
/// Macros taking arguments need braces around them, e.g. `^{\mathbf{u}}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TensorIndices;

impl MathHook for TensorIndices {
    fn name(&self) -> &'static str {
        "tensor-indices"
    }

    fn process(&self, node: &mut MathNode, _ctx: &mut RenderContext) {
        if node.body.contains(INDICES) {
            node.body = expand_indices(&node.body);
        }
    }
}

const INDICES: &str = "\\indices";

fn expand_indices(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(pos) = rest.find(INDICES) {
        let after = &rest[pos + INDICES.len()..];
        let open = after.len() - after.trim_start().len();
        let group = after[open..]
            .starts_with('{')
            .then(|| balanced_group(&after[open..]))
            .flatten();

        match group {
            Some(close) => {
                out.push_str(&rest[..pos]);
                out.push_str(&render_indices(&after[open + 1..open + close]));
                rest = &after[open + close + 1..];
            }
            None => {
                out.push_str(&rest[..pos + INDICES.len()]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Byte offset of the `}` closing the `{` at the start of `s`.
fn balanced_group(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn render_indices(indices: &str) -> String {
    let mut up = String::new();
    let mut down = String::new();
    let mut sign: Option<char> = None;
    let mut i = 0;

    while i < indices.len() {
        let rest = &indices[i..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        if c == '^' || c == '_' {
            sign = Some(c);
            i += 1;
            continue;
        }

        let value = if c == '{' {
            balanced_group(rest).map(|close| (&rest[1..close], close + 1))
        } else {
            INDEX_TOKEN_RE
                .find(rest)
                .map(|m| (m.as_str(), m.end()))
        };

        match value {
            Some((value, consumed)) => {
                match sign.take() {
                    Some('^') => {
                        up.push_str(value);
                        down.push_str(&format!("\\phantom{{{value}}}"));
                    }
                    Some(_) => {
                        up.push_str(&format!("\\phantom{{{value}}}"));
                        down.push_str(value);
                    }
                    None => {}
                }
                i += consumed;
            }
            None => i += c.len_utf8(),
        }
    }

    format!("^{{{up}}}_{{{down}}}")
}

static MATH_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").expect("valid math span regex"));

static NUMBERED_ENV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\\begin\{(?:align|alignat|equation|gather|multline)\*?\}")
        .expect("valid environment regex")
});

static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\label\{([^}]*)\}").expect("valid label regex"));

static INDEX_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\\?[[:alnum:]]+").expect("valid index token regex"));
