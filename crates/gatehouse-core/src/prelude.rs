//! Prelude module - commonly used types for convenient import.
//!
//! Use `use gatehouse_core::prelude::*;` to import all essential types.

// Identifiers & time
pub use crate::{ActorId, CredentialId, MerchantId, RecordId, RequestId, Timestamp};

// Clock
pub use crate::{Clock, ManualClock, SystemClock};

// Permissions
pub use crate::{AccessLevel, Permission};

// Collaborators
pub use crate::{ActorDirectory, ActorRole, Blacklist, NoBlacklist, StaticBlacklist, StaticDirectory};
