// src/normalizer/style.rs
//! Inline `style` attribute rewriting.
//!
//! Tags are located with a regex, but the attribute value itself goes
//! through a tolerant declaration parse and a deterministic re-serialize
//! instead of string surgery, so rewritten tags always come out in the
//! same canonical `prop: value; prop: value` shape.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// How a `text-align: center` declaration is neutralized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFix {
    /// Rewrite the declaration to `text-align: left` in place.
    Replace,
    /// Keep the declaration but append `text-align: left !important`
    /// after it, letting the cascade settle the fight.
    Important,
}

static STYLED_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<([a-z][a-z0-9-]*)([^>]*?\s)style\s*=\s*(?:"([^"]*)"|'([^']*)')([^>]*)>"#)
        .expect("STYLED_TAG_RE: hardcoded regex is statically valid")
});

/// Rewrite every element-opening tag whose `style` attribute declares
/// center alignment. Tags without such a declaration are untouched
/// byte-for-byte, which keeps the pass idempotent.
pub(crate) fn neutralize_centering(html: &str, fix: AlignmentFix) -> String {
    STYLED_TAG_RE
        .replace_all(html, |caps: &Captures| {
            let (value, quote) = match caps.get(3) {
                Some(double) => (double.as_str(), '"'),
                None => (caps.get(4).map_or("", |m| m.as_str()), '\''),
            };
            match rewrite_style(value, fix) {
                Some(rewritten) => format!(
                    "<{}{}style={quote}{rewritten}{quote}{}>",
                    &caps[1], &caps[2], &caps[5],
                ),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

enum Declaration {
    Pair(String, String),
    /// A fragment without a colon; carried through verbatim.
    Raw(String),
}

fn parse_declarations(style: &str) -> Vec<Declaration> {
    style
        .split(';')
        .filter_map(|decl| {
            let decl = decl.trim();
            if decl.is_empty() {
                return None;
            }
            Some(match decl.split_once(':') {
                Some((prop, value)) => {
                    Declaration::Pair(prop.trim().to_string(), value.trim().to_string())
                }
                None => Declaration::Raw(decl.to_string()),
            })
        })
        .collect()
}

fn is_center_value(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    let core = lower.strip_suffix("!important").unwrap_or(&lower).trim_end();
    core == "center"
}

fn forces_left(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower
        .strip_suffix("!important")
        .map(|rest| rest.trim_end() == "left")
        .unwrap_or(false)
}

/// Returns the canonical rewritten style value, or `None` when the tag
/// needs no change.
fn rewrite_style(style: &str, fix: AlignmentFix) -> Option<String> {
    let declarations = parse_declarations(style);

    let centered = declarations.iter().any(|decl| {
        matches!(decl, Declaration::Pair(prop, value)
            if prop.eq_ignore_ascii_case("text-align") && is_center_value(value))
    });
    if !centered {
        return None;
    }

    if fix == AlignmentFix::Important {
        let already_forced = declarations.iter().any(|decl| {
            matches!(decl, Declaration::Pair(prop, value)
                if prop.eq_ignore_ascii_case("text-align") && forces_left(value))
        });
        if already_forced {
            return None;
        }
    }

    let mut parts: Vec<String> = declarations
        .into_iter()
        .map(|decl| match decl {
            Declaration::Pair(prop, value) => {
                if fix == AlignmentFix::Replace
                    && prop.eq_ignore_ascii_case("text-align")
                    && is_center_value(&value)
                {
                    "text-align: left".to_string()
                } else {
                    format!("{}: {}", prop, value)
                }
            }
            Declaration::Raw(raw) => raw,
        })
        .collect();

    if fix == AlignmentFix::Important {
        parts.push("text-align: left !important".to_string());
    }

    Some(parts.join("; "))
}
