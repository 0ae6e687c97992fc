//! Parse a rendered artifact back into comparable fields.
//!
//! Understands exactly the shapes produced by [`crate::format`]:
//!
//! ```text
//! ---
//! key: "value"          -> Text
//! key: []               -> List (empty)
//! key:                  -> List, items follow as `    - "item"`
//! # key: "value"        -> Disabled (repeatable: alternatives)
//! # free comment        -> ignored
//! ---
//!
//! body
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::format::unquote;

static FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*):(.*)$").expect("valid regex"));
static DISABLED_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s*([A-Za-z_][A-Za-z0-9_-]*):(.*)$").expect("valid regex"));
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-\s*(.*)$").expect("valid regex"));

/// Value of one front-matter field as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    /// Commented-out `# key: value` lines, in file order.
    Disabled(Vec<String>),
}

/// Front-matter fields plus body text of one artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub fields: BTreeMap<String, FieldValue>,
    /// Body with surrounding whitespace trimmed.
    pub body: String,
}

impl Document {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

/// Parse `content`. Content without a front-matter fence is all body.
pub fn parse(content: &str) -> Document {
    let content = content.replace("\r\n", "\n");
    let mut lines = content.lines();

    let opened = lines
        .by_ref()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim() == "---")
        .unwrap_or(false);
    if !opened {
        return Document {
            fields: BTreeMap::new(),
            body: content.trim().to_string(),
        };
    }

    let mut fields = BTreeMap::new();
    let mut open_list: Option<String> = None;
    let mut closed = false;

    for line in lines.by_ref() {
        if line.trim() == "---" {
            closed = true;
            break;
        }

        if let Some(name) = open_list.as_ref() {
            if let Some(caps) = LIST_ITEM.captures(line) {
                if let Some(FieldValue::List(items)) = fields.get_mut(name) {
                    items.push(unquote(&caps[1]));
                }
                continue;
            }
            open_list = None;
        }

        if let Some(caps) = DISABLED_FIELD.captures(line) {
            let value = unquote(&caps[2]);
            // An active value takes precedence over commented ones.
            if let FieldValue::Disabled(values) = fields
                .entry(caps[1].to_string())
                .or_insert_with(|| FieldValue::Disabled(Vec::new()))
            {
                values.push(value);
            }
            continue;
        }
        if line.trim_start().starts_with('#') {
            continue;
        }

        if let Some(caps) = FIELD.captures(line) {
            let name = caps[1].to_string();
            let raw = caps[2].trim();
            let value = match raw {
                "" => {
                    open_list = Some(name.clone());
                    FieldValue::List(Vec::new())
                }
                "[]" => FieldValue::List(Vec::new()),
                _ => FieldValue::Text(unquote(raw)),
            };
            fields.insert(name, value);
        }
    }

    let body = if closed {
        lines.collect::<Vec<_>>().join("\n").trim().to_string()
    } else {
        String::new()
    };
    Document { fields, body }
}
