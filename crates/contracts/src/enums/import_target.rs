use serde::{Deserialize, Serialize};

/// Сущности, которые можно загружать пакетно из таблицы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportTarget {
    Faq,
    VehicleMake,
    User,
}

impl ImportTarget {
    /// Код цели импорта (используется в URL)
    pub fn code(&self) -> &'static str {
        match self {
            ImportTarget::Faq => "faq",
            ImportTarget::VehicleMake => "vehicle-make",
            ImportTarget::User => "user",
        }
    }

    /// Человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            ImportTarget::Faq => "FAQ entries",
            ImportTarget::VehicleMake => "Vehicle makes",
            ImportTarget::User => "Users",
        }
    }

    /// Коллекция во внешнем REST API, куда создаются записи
    pub fn collection(&self) -> &'static str {
        match self {
            ImportTarget::Faq => "faqs",
            ImportTarget::VehicleMake => "vehicle-makes",
            ImportTarget::User => "users",
        }
    }

    pub fn all() -> Vec<ImportTarget> {
        vec![
            ImportTarget::Faq,
            ImportTarget::VehicleMake,
            ImportTarget::User,
        ]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "faq" => Some(ImportTarget::Faq),
            "vehicle-make" => Some(ImportTarget::VehicleMake),
            "user" => Some(ImportTarget::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
