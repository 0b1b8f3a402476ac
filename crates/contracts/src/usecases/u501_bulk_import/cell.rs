use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Значение ячейки в том виде, в котором его отдал парсер таблицы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Blank,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Приводит значение к обрезанной строке.
    /// Целые числа выводятся без дробной части (`30.0` -> `"30"`).
    pub fn normalized(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.trim().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.normalized().is_empty()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Blank
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

/// Строка таблицы без типизации.
///
/// Ключи - заголовки колонок, обрезанные и приведенные к нижнему регистру,
/// чтобы поиск колонки не зависел от того, как пользователь набрал заголовок.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRow {
    /// Номер строки в таблице (заголовок = 1)
    pub row: u32,
    pub cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new(row: u32) -> Self {
        Self {
            row,
            cells: HashMap::new(),
        }
    }

    pub fn insert(&mut self, header: &str, value: CellValue) {
        self.cells.insert(normalize_header(header), value);
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(&normalize_header(key))
    }

    /// Значение колонки как обрезанная строка; отсутствующая колонка дает `""`
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(CellValue::normalized).unwrap_or_default()
    }
}

pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}
