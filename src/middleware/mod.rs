pub mod connection_limit;

pub use connection_limit::{SlotGuard, connection_limit_middleware};
