pub mod auth_api;
pub mod file_validation;
pub mod jwt;
pub mod password;

pub use auth_api::{AuthConfig, AuthError, AuthenticatedUser, SessionState};
pub use file_validation::{validate_file_upload, FileValidationConfig, FileValidationResult};
pub use jwt::{JwtConfig, JwtManager, SessionToken};
pub use password::{hash_password, validate_password, verify_password, CredentialHasher};
