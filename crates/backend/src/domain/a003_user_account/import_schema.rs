use contracts::domain::a003_user_account::{UserAccount, UserRole};
use contracts::enums::ImportTarget;

use crate::usecases::u501_bulk_import::schema::{ImportColumn, ImportSchema, RowContext};
use crate::usecases::u501_bulk_import::validators;

const FULL_NAME_MAX: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAccountColumn {
    Username,
    Email,
    FullName,
    Role,
}

impl ImportColumn for UserAccountColumn {
    const ALL: &'static [Self] = &[
        UserAccountColumn::Username,
        UserAccountColumn::Email,
        UserAccountColumn::FullName,
        UserAccountColumn::Role,
    ];

    fn key(self) -> &'static str {
        match self {
            UserAccountColumn::Username => "username",
            UserAccountColumn::Email => "email",
            UserAccountColumn::FullName => "full_name",
            UserAccountColumn::Role => "role",
        }
    }

    fn title(self) -> &'static str {
        match self {
            UserAccountColumn::Username => "Username",
            UserAccountColumn::Email => "Email",
            UserAccountColumn::FullName => "Full name",
            UserAccountColumn::Role => "Role",
        }
    }

    // full_name и role можно не указывать в файле
    fn required(self) -> bool {
        matches!(self, UserAccountColumn::Username | UserAccountColumn::Email)
    }
}

/// Импорт пользователей
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAccountImport;

impl ImportSchema for UserAccountImport {
    type Column = UserAccountColumn;
    type Record = UserAccount;

    fn target(&self) -> ImportTarget {
        ImportTarget::User
    }

    fn template_rows(&self) -> Vec<UserAccount> {
        vec![
            UserAccount {
                username: "jdoe".to_string(),
                email: "jdoe@example.com".to_string(),
                full_name: Some("John Doe".to_string()),
                role: UserRole::Editor,
            },
            UserAccount {
                username: "guest.reader".to_string(),
                email: "reader@example.com".to_string(),
                full_name: None,
                role: UserRole::Viewer,
            },
        ]
    }

    fn cell(&self, record: &UserAccount, column: UserAccountColumn) -> String {
        match column {
            UserAccountColumn::Username => record.username.clone(),
            UserAccountColumn::Email => record.email.clone(),
            UserAccountColumn::FullName => record.full_name.clone().unwrap_or_default(),
            UserAccountColumn::Role => record.role.code().to_string(),
        }
    }

    fn validate_row(&self, row: &mut RowContext<'_, UserAccountColumn>) -> Option<UserAccount> {
        let username = row.field(UserAccountColumn::Username, validators::username);
        let email = row.field(UserAccountColumn::Email, validators::email);
        let full_name = row.field(UserAccountColumn::FullName, |v| {
            validators::optional_text(v, FULL_NAME_MAX)
        });
        let roles: Vec<&str> = UserRole::all().iter().map(UserRole::code).collect();
        let role = row.field(UserAccountColumn::Role, |v| {
            validators::one_of_or(v, UserRole::from_code, &roles, UserRole::default())
        });

        Some(UserAccount {
            username: username?,
            email: email?,
            full_name: full_name?,
            role: role?,
        })
    }

    fn natural_key(&self, record: &UserAccount) -> Option<(UserAccountColumn, String)> {
        Some((UserAccountColumn::Username, record.username.clone()))
    }
}
