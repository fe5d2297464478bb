pub mod identity;
pub mod resolver;

pub use identity::{DlcId, LookupEntry, RequirementRow, ResolvedIdentity, UNKNOWN_REGION};
pub use resolver::IdentifierResolver;
