//! Command templates.
//!
//! Writers describe their commands as Jinja templates rendered with two
//! variables: `before` (the value being replaced, absent on create) and
//! `data` (the new value, absent on delete). Unset leaves are undefined,
//! so `{% if data.mtu %}` and `{% if before.mtu and not data.mtu %}` are
//! how a template diffs fields.
//!
//! Rendered text is normalised: blank lines are dropped, trailing
//! whitespace trimmed and a final newline added, so templates can be laid
//! out for readability.
//!
//! # Example
//!
//! ```
//! use cliunit_common::template;
//! use serde_json::json;
//!
//! const T: &str = "interface {{ data.name }}\n{% if data.mtu %}mtu {{ data.mtu }}\n{% endif %}end";
//!
//! let out = template::render(T, None::<&()>, Some(&json!({"name": "Loopback0", "mtu": 1500}))).unwrap();
//! assert_eq!(out, "interface Loopback0\nmtu 1500\nend\n");
//! ```

use itertools::Itertools;
use minijinja::{context, Environment, UndefinedBehavior};
use once_cell::sync::Lazy;
use serde::Serialize;

use cliunit_types::prefix_len_to_mask;

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.add_filter("netmask", netmask);
    env.add_filter("quote", quote);
    env
});

/// `{{ 24 | netmask }}` -> `255.255.255.0`
fn netmask(prefix_len: u8) -> String {
    prefix_len_to_mask(prefix_len).to_string()
}

/// `{{ "a b" | quote }}` -> `"a b"`; single words are left alone.
fn quote(value: String) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value
    }
}

/// Renders a writer template with `before` and `data` in scope.
pub fn render<B, D>(template: &str, before: Option<&B>, data: Option<&D>) -> Result<String, minijinja::Error>
where
    B: Serialize + ?Sized,
    D: Serialize + ?Sized,
{
    let rendered = ENV.render_str(template, context! { before => before, data => data })?;
    Ok(normalize(&rendered))
}

/// Renders a template with an arbitrary context.
pub fn render_with<S: Serialize>(template: &str, ctx: S) -> Result<String, minijinja::Error> {
    let rendered = ENV.render_str(template, ctx)?;
    Ok(normalize(&rendered))
}

fn normalize(rendered: &str) -> String {
    let body = rendered
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .join("\n");
    if body.is_empty() {
        body
    } else {
        body + "\n"
    }
}
