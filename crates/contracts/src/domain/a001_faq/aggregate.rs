use serde::{Deserialize, Serialize};

/// Запись FAQ (вопрос и ответ)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub title: String,
    pub description: String,
}

impl FaqEntry {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}
