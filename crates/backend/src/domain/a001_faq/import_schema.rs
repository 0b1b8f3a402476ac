use contracts::domain::a001_faq::FaqEntry;
use contracts::enums::ImportTarget;

use crate::usecases::u501_bulk_import::schema::{ImportColumn, ImportSchema, RowContext};
use crate::usecases::u501_bulk_import::validators;

pub const TITLE_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaqColumn {
    Title,
    Description,
}

impl ImportColumn for FaqColumn {
    const ALL: &'static [Self] = &[FaqColumn::Title, FaqColumn::Description];

    fn key(self) -> &'static str {
        match self {
            FaqColumn::Title => "title",
            FaqColumn::Description => "description",
        }
    }

    fn title(self) -> &'static str {
        match self {
            FaqColumn::Title => "Question",
            FaqColumn::Description => "Answer",
        }
    }
}

/// Импорт вопросов-ответов (FAQ)
#[derive(Debug, Clone, Copy, Default)]
pub struct FaqImport;

impl ImportSchema for FaqImport {
    type Column = FaqColumn;
    type Record = FaqEntry;

    fn target(&self) -> ImportTarget {
        ImportTarget::Faq
    }

    fn template_rows(&self) -> Vec<FaqEntry> {
        vec![
            FaqEntry::new(
                "What is your return policy?",
                "We offer a 30-day return policy.",
            ),
            FaqEntry::new(
                "How long does delivery take?",
                "Orders are delivered within 3-5 business days.",
            ),
        ]
    }

    fn cell(&self, record: &FaqEntry, column: FaqColumn) -> String {
        match column {
            FaqColumn::Title => record.title.clone(),
            FaqColumn::Description => record.description.clone(),
        }
    }

    fn validate_row(&self, row: &mut RowContext<'_, FaqColumn>) -> Option<FaqEntry> {
        let title = row.field(FaqColumn::Title, |v| validators::required_text(v, TITLE_MAX));
        let description = row.field(FaqColumn::Description, |v| {
            validators::required_text(v, DESCRIPTION_MAX)
        });

        Some(FaqEntry {
            title: title?,
            description: description?,
        })
    }

    fn natural_key(&self, record: &FaqEntry) -> Option<(FaqColumn, String)> {
        Some((FaqColumn::Title, record.title.clone()))
    }
}
