//! Re-evaluated element queries.
//!
//! A [`Locator`] never holds a reference to a DOM node. Every call to one of
//! the script builders produces a fresh JavaScript expression which the
//! driver evaluates against the current document, so each poll sees the page
//! as it is at that moment.

use std::fmt;

/// Normalizes whitespace and case before text comparison.
const NORMALIZE_FN: &str =
    "const __norm = s => (s || '').replace(/\\s+/g, ' ').trim().toLowerCase();";

/// Attached, rendered with a non-empty box, and not `visibility: hidden`.
const VISIBLE_FN: &str = "const __visible = el => { \
     if (!el || !el.isConnected) return false; \
     const style = window.getComputedStyle(el); \
     if (style.visibility === 'hidden') return false; \
     const r = el.getBoundingClientRect(); \
     return r.width > 0 && r.height > 0; };";

/// Evaluates to `true` when an editable element holds input focus.
pub const EDITABLE_FOCUS_SCRIPT: &str = "(() => { \
     const el = document.activeElement; \
     if (!el || el === document.body) return false; \
     if (el.isContentEditable) return true; \
     const tag = el.tagName; \
     return tag === 'INPUT' || tag === 'TEXTAREA'; })()";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector, all matches
    Css(String),
    /// Element with the given `id` attribute
    Id(String),
    /// Innermost elements whose text contains the needle
    Text(String),
    /// CSS matches whose text contains the needle
    CssWithText { css: String, text: String },
    /// Union of several selectors, in declaration order
    Any(Vec<Selector>),
}

impl Selector {
    fn elements_expr(&self) -> String {
        match self {
            Selector::Css(css) => {
                format!("Array.from(document.querySelectorAll({}))", js_str(css))
            }
            Selector::Id(id) => {
                format!("[document.getElementById({})].filter(Boolean)", js_str(id))
            }
            Selector::Text(text) => format!(
                "(() => {{ const needle = __norm({}); \
                 return Array.from(document.querySelectorAll('body *')) \
                 .filter(el => !['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE'].includes(el.tagName)) \
                 .filter(el => __norm(el.textContent).includes(needle)) \
                 .filter(el => !Array.from(el.children).some(c => __norm(c.textContent).includes(needle))); }})()",
                js_str(text)
            ),
            Selector::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => __norm(el.textContent).includes(__norm({})))",
                js_str(css),
                js_str(text)
            ),
            Selector::Any(parts) => {
                let joined = parts
                    .iter()
                    .map(|p| format!("...{}", p.elements_expr()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[...new Set([{}])]", joined)
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "css={}", css),
            Selector::Id(id) => write!(f, "#{}", id),
            Selector::Text(text) => write!(f, "text={:?}", text),
            Selector::CssWithText { css, text } => write!(f, "{}:has-text({:?})", css, text),
            Selector::Any(parts) => {
                let parts = parts.iter().map(|p| p.to_string()).collect::<Vec<_>>();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// A query for page elements, resolved fresh on every use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    strict: bool,
}

impl Locator {
    fn new(selector: Selector) -> Self {
        Self {
            selector,
            strict: true,
        }
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::new(Selector::Css(css.into()))
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new(Selector::Id(id.into()))
    }

    /// Matches the innermost elements containing `text`, ignoring case and
    /// collapsing whitespace.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Selector::Text(text.into()))
    }

    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Selector::CssWithText {
            css: css.into(),
            text: text.into(),
        })
    }

    /// Union of this locator and `other`. Nested unions are flattened.
    pub fn or(self, other: Locator) -> Self {
        let mut parts = match self.selector {
            Selector::Any(parts) => parts,
            selector => vec![selector],
        };
        match other.selector {
            Selector::Any(more) => parts.extend(more),
            selector => parts.push(selector),
        }
        Self {
            selector: Selector::Any(parts),
            strict: self.strict && other.strict,
        }
    }

    /// Accept any number of matches and act on the first one
    pub fn first(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Script evaluating to the number of visible matches
    pub fn visible_count_script(&self) -> String {
        format!(
            "(() => {{ {} {} return {}.filter(__visible).length; }})()",
            NORMALIZE_FN,
            VISIBLE_FN,
            self.selector.elements_expr()
        )
    }

    /// Script that focuses the first match, optionally selecting its
    /// current content. Evaluates to `false` when nothing matched.
    pub fn focus_script(&self, select_all: bool) -> String {
        let select = if select_all {
            "if (typeof el.select === 'function') { el.select(); } \
             else if (el.isContentEditable) { document.execCommand('selectAll'); }"
        } else {
            ""
        };
        format!(
            "(() => {{ {} const el = {}[0]; if (!el) return false; \
             el.focus(); {} return true; }})()",
            NORMALIZE_FN,
            self.selector.elements_expr(),
            select
        )
    }

    /// Script that removes focus from the first match. Evaluates to `false`
    /// when nothing matched.
    pub fn blur_script(&self) -> String {
        format!(
            "(() => {{ {} const el = {}[0]; if (!el) return false; \
             el.blur(); return true; }})()",
            NORMALIZE_FN,
            self.selector.elements_expr()
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.strict {
            write!(f, "{}", self.selector)
        } else {
            write!(f, "{} >> first", self.selector)
        }
    }
}

/// Quote a string as a JavaScript literal
fn js_str(value: &str) -> String {
    // JSON strings are valid JS string literals
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_is_strict_until_first() {
        let locator = Locator::text("Undone");
        assert!(locator.is_strict());
        assert!(!locator.first().is_strict());
    }

    #[test]
    fn test_or_flattens_nested_unions() {
        let locator = Locator::css_with_text("h1", "Last Task")
            .or(Locator::css_with_text("h1", "Today"))
            .or(Locator::id("main"));

        match locator.selector() {
            Selector::Any(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_display_describes_locator() {
        let heading = Locator::css_with_text("h1", "Last Task")
            .or(Locator::css_with_text("h1", "Today"))
            .first();

        assert_eq!(
            heading.to_string(),
            "h1:has-text(\"Last Task\"), h1:has-text(\"Today\") >> first"
        );
        assert_eq!(Locator::id("main-bullet-editor-input").to_string(), "#main-bullet-editor-input");
        assert_eq!(Locator::text("Undone").to_string(), "text=\"Undone\"");
    }

    #[test]
    fn test_scripts_quote_text_safely() {
        let locator = Locator::text("it's a \"quoted\" task");
        let script = locator.visible_count_script();

        assert!(script.contains(r#""it's a \"quoted\" task""#));
        assert!(script.contains("__visible"));
        assert!(script.ends_with("})()"));
    }

    #[test]
    fn test_id_script_uses_get_element_by_id() {
        let script = Locator::id("main-bullet-editor-input").focus_script(true);

        assert!(script.contains("document.getElementById(\"main-bullet-editor-input\")"));
        assert!(script.contains("el.select()"));
        assert!(!Locator::id("x").focus_script(false).contains("el.select()"));
    }

    #[test]
    fn test_union_script_deduplicates() {
        let script = Locator::css("h1").or(Locator::text("Today")).visible_count_script();
        assert!(script.contains("new Set"));
    }

    #[test]
    fn test_editable_focus_matches_shortcut_guard() {
        assert!(EDITABLE_FOCUS_SCRIPT.contains("'INPUT'"));
        assert!(EDITABLE_FOCUS_SCRIPT.contains("'TEXTAREA'"));
        assert!(EDITABLE_FOCUS_SCRIPT.contains("isContentEditable"));
        assert!(!EDITABLE_FOCUS_SCRIPT.contains("SELECT"));
    }
}
