//! Macro substitution: `{{name}}` and `{{name:arg1|arg2}}`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Typed mapping from macro name to replacement template.
///
/// Templates may use `#1`..`#9` for positional arguments. A token naming
/// an unknown macro is left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroTable {
    templates: HashMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Layer `other` on top of this table; its templates win.
    pub fn merged(&self, other: &MacroTable) -> MacroTable {
        let mut templates = self.templates.clone();
        templates.extend(other.templates.iter().map(|(k, v)| (k.clone(), v.clone())));
        MacroTable { templates }
    }

    /// Expand every macro token in `text`.
    ///
    /// ```
    /// use pagepress_core::filters::MacroTable;
    ///
    /// let mut macros = MacroTable::new();
    /// macros.insert("R", r"\mathbb{R}");
    /// macros.insert("norm", r"\lVert #1 \rVert");
    /// assert_eq!(macros.expand("{{R}} and {{norm:x}}"), r"\mathbb{R} and \lVert x \rVert");
    /// assert_eq!(macros.expand("{{unknown}}"), "{{unknown}}");
    /// ```
    pub fn expand(&self, text: &str) -> String {
        if self.is_empty() || !text.contains("{{") {
            return text.to_string();
        }

        MACRO_RE
            .replace_all(text, |caps: &Captures<'_>| {
                let name = &caps["name"];
                match self.get(name) {
                    Some(template) => {
                        let args: Vec<&str> = caps
                            .name("args")
                            .map(|m| m.as_str().split('|').map(str::trim).collect())
                            .unwrap_or_default();
                        fill_template(template, &args)
                    }
                    None => {
                        debug!("Leaving unknown macro '{}' unexpanded", name);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

/// Replace `#n` with the n-th argument; missing arguments stay as written.
fn fill_template(template: &str, args: &[&str]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let index = caps[1].parse::<usize>().unwrap_or(0);
            args.get(index.wrapping_sub(1))
                .map(|arg| arg.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

static MACRO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(?P<name>[A-Za-z][\w-]*)\s*(?::(?P<args>[^{}]*))?\}\}")
        .expect("valid macro regex")
});

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([1-9])").expect("valid placeholder regex"));
