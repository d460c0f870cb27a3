pub mod phone_validation;
pub use phone_validation::{PhoneNumberError, validate_phone_number};
pub mod server_domain;
pub use server_domain::{DomainDiscoveryError, discover_ngrok_domain, resolve_server_domain};
