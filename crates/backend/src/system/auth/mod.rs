pub mod credentials;
pub mod extractor;

pub use credentials::{
    CredentialError, CredentialProvider, EnvCredentials, NoCredentials, StaticCredentials,
};
pub use extractor::BearerToken;
