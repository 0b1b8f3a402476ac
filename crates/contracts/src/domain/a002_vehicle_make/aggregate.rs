use serde::{Deserialize, Serialize};

/// Статус марки автомобиля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleMakeStatus {
    Active,
    Inactive,
}

impl VehicleMakeStatus {
    pub fn code(&self) -> &'static str {
        match self {
            VehicleMakeStatus::Active => "active",
            VehicleMakeStatus::Inactive => "inactive",
        }
    }

    pub fn all() -> Vec<VehicleMakeStatus> {
        vec![VehicleMakeStatus::Active, VehicleMakeStatus::Inactive]
    }

    /// Парсинг без учета регистра
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "active" => Some(VehicleMakeStatus::Active),
            "inactive" => Some(VehicleMakeStatus::Inactive),
            _ => None,
        }
    }
}

/// Марка автомобиля
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleMake {
    pub make: String,
    pub short_code: String,
    pub status: VehicleMakeStatus,
}
