//! Property-based tests for the template parser.

use proptest::prelude::*;

use super::template::{Escape, Template, TemplateData, TemplateSection};
use crate::bundle::{Fields, LedgerColumn};

struct Empty;

impl TemplateData for Empty {
    fn scalar(&self, _name: &str) -> Option<String> {
        None
    }

    fn rows(&self, _list: &str) -> Option<&[Fields]> {
        None
    }

    fn section_visible(&self, _section: TemplateSection) -> bool {
        false
    }

    fn column_visible(&self, _column: LedgerColumn) -> bool {
        false
    }
}

proptest! {
    /// Text without comments or placeholders renders unchanged.
    #[test]
    fn prop_plain_text_is_identity(text in "[^<$]*") {
        let template = Template::parse(&text).unwrap();
        prop_assert_eq!(template.render(&Empty, Escape::Html).unwrap(), text);
    }

    /// A hidden section removes its body and keeps the surrounding text.
    #[test]
    fn prop_hidden_section_removed(
        before in "[a-z ]{0,12}",
        body in "[a-z ]{0,12}",
        after in "[a-z ]{0,12}",
    ) {
        let source = format!(
            "{before}<!-- BEGIN SECTION notice -->{body}<!-- END SECTION notice -->{after}"
        );
        let rendered = Template::parse(&source).unwrap().render(&Empty, Escape::Html).unwrap();
        prop_assert_eq!(rendered, format!("{before}{after}"));
    }

    /// Unresolved placeholders vanish.
    #[test]
    fn prop_unresolved_placeholder_is_empty(name in "[A-Za-z_][A-Za-z0-9_]{0,10}") {
        let source = format!("[${{{name}}}]");
        let rendered = Template::parse(&source).unwrap().render(&Empty, Escape::Html).unwrap();
        prop_assert_eq!(rendered, "[]");
    }
}
