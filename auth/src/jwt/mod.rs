pub mod claims;
pub mod errors;
pub mod handler;
pub mod issuer;
pub mod validator;

pub use claims::AccessClaims;
pub use claims::AccessDetails;
pub use claims::Expiring;
pub use claims::RefreshClaims;
pub use claims::TokenPair;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use issuer::TokenIssuer;
pub use issuer::TokenTtl;
pub use validator::TokenValidator;
