use contracts::domain::a002_vehicle_make::{VehicleMake, VehicleMakeStatus};
use contracts::enums::ImportTarget;

use crate::usecases::u501_bulk_import::schema::{ImportColumn, ImportSchema, RowContext};
use crate::usecases::u501_bulk_import::validators;

const MAKE_MAX: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleMakeColumn {
    Make,
    ShortCode,
    Status,
}

impl ImportColumn for VehicleMakeColumn {
    const ALL: &'static [Self] = &[
        VehicleMakeColumn::Make,
        VehicleMakeColumn::ShortCode,
        VehicleMakeColumn::Status,
    ];

    fn key(self) -> &'static str {
        match self {
            VehicleMakeColumn::Make => "make",
            VehicleMakeColumn::ShortCode => "short_code",
            VehicleMakeColumn::Status => "status",
        }
    }

    fn title(self) -> &'static str {
        match self {
            VehicleMakeColumn::Make => "Make",
            VehicleMakeColumn::ShortCode => "Short code",
            VehicleMakeColumn::Status => "Status",
        }
    }
}

/// Импорт марок автомобилей
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleMakeImport;

impl ImportSchema for VehicleMakeImport {
    type Column = VehicleMakeColumn;
    type Record = VehicleMake;

    fn target(&self) -> ImportTarget {
        ImportTarget::VehicleMake
    }

    fn template_rows(&self) -> Vec<VehicleMake> {
        vec![
            VehicleMake {
                make: "Toyota".to_string(),
                short_code: "TOY".to_string(),
                status: VehicleMakeStatus::Active,
            },
            VehicleMake {
                make: "Saab".to_string(),
                short_code: "SAAB".to_string(),
                status: VehicleMakeStatus::Inactive,
            },
        ]
    }

    fn cell(&self, record: &VehicleMake, column: VehicleMakeColumn) -> String {
        match column {
            VehicleMakeColumn::Make => record.make.clone(),
            VehicleMakeColumn::ShortCode => record.short_code.clone(),
            VehicleMakeColumn::Status => record.status.code().to_string(),
        }
    }

    fn render(&self, record: &VehicleMake, column: VehicleMakeColumn) -> String {
        match (column, record.status) {
            (VehicleMakeColumn::Status, VehicleMakeStatus::Active) => "Active".to_string(),
            (VehicleMakeColumn::Status, VehicleMakeStatus::Inactive) => "Inactive".to_string(),
            _ => self.cell(record, column),
        }
    }

    fn validate_row(&self, row: &mut RowContext<'_, VehicleMakeColumn>) -> Option<VehicleMake> {
        let make = row.field(VehicleMakeColumn::Make, |v| validators::required_text(v, MAKE_MAX));
        let short_code = row.field(VehicleMakeColumn::ShortCode, validators::short_code);
        let statuses: Vec<&str> = VehicleMakeStatus::all()
            .iter()
            .map(VehicleMakeStatus::code)
            .collect();
        let status = row.field(VehicleMakeColumn::Status, |v| {
            validators::one_of(v, VehicleMakeStatus::from_code, &statuses)
        });

        Some(VehicleMake {
            make: make?,
            short_code: short_code?,
            status: status?,
        })
    }

    fn natural_key(&self, record: &VehicleMake) -> Option<(VehicleMakeColumn, String)> {
        Some((VehicleMakeColumn::ShortCode, record.short_code.clone()))
    }
}
