//! HTML statement rendering.

use super::error::TemplateError;
use super::template::{Escape, Template, TemplateData, TemplateSection};
use crate::bundle::{Fields, LedgerColumn, RenderContext};
use crate::profile::TemplateVisibilityProfile;

/// A bundle's render context seen through a visibility profile.
#[derive(Debug, Clone, Copy)]
pub struct StatementView<'a> {
    context: &'a RenderContext,
    profile: &'a TemplateVisibilityProfile,
}

impl<'a> StatementView<'a> {
    /// Creates a view.
    #[must_use]
    pub fn new(context: &'a RenderContext, profile: &'a TemplateVisibilityProfile) -> Self {
        Self { context, profile }
    }
}

impl TemplateData for StatementView<'_> {
    fn scalar(&self, name: &str) -> Option<String> {
        self.context.scalar(name)
    }

    fn rows(&self, list: &str) -> Option<&[Fields]> {
        self.context.list(list)
    }

    fn section_visible(&self, section: TemplateSection) -> bool {
        match section {
            TemplateSection::Stamp => self.profile.show_stamp,
            TemplateSection::TypeSummary => self.profile.show_type_summary,
            TemplateSection::Notice => self.profile.show_notice,
            TemplateSection::BankAccount => self.profile.show_bank_account,
            TemplateSection::Contact => self.profile.show_contact,
            TemplateSection::ShowMore => self.context.show_more(),
        }
    }

    fn column_visible(&self, column: LedgerColumn) -> bool {
        self.profile.column_visible(column)
    }
}

/// Renders the HTML statement.
///
/// # Errors
///
/// Returns an error if the template references a list the bundle lacks.
pub fn render_statement(
    template: &Template,
    context: &RenderContext,
    profile: &TemplateVisibilityProfile,
) -> Result<String, TemplateError> {
    template.render(&StatementView::new(context, profile), Escape::Html)
}
