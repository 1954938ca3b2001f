pub mod types;
pub mod validator;

pub use types::{AuthenticationSource, Identity, Role, SessionCookie};
pub use validator::{
    DEFAULT_VALIDATION_TIMEOUT, HttpSessionValidator, SessionValidator, ValidationError,
};
