pub mod chain;
pub mod config;
pub mod error;
pub mod lookups;

pub use chain::{Resolution, ResolverChain};
pub use config::ResolverConfig;
pub use error::LookupError;
pub use lookups::NameLookup;
