//! Standing consent for gated capabilities.
//!
//! Some actions are not risky per call but need the human's one-time
//! permission before the agent may use them at all. Reading the command
//! history is the only such capability today.
//!
//! # Overview
//!
//! - **[`Capability`]**: A capability that requires standing consent
//! - **[`ConsentGrant`]**: A recorded grant with its timestamp
//! - **[`ConsentStore`]**: Session-scoped set of grants
//!
//! Consent lasts for the session. There is no revoke and nothing is
//! persisted, so a new session starts with no grants.
//!
//! # Example
//!
//! ```rust
//! use chatty_core::consent::{Capability, ConsentStore};
//!
//! let store = ConsentStore::new();
//! assert!(!store.has_consent(Capability::HistoryLookup));
//!
//! let first = store.grant(Capability::HistoryLookup);
//! let second = store.grant(Capability::HistoryLookup);
//! assert_eq!(first, second);
//! assert!(store.has_consent(Capability::HistoryLookup));
//! ```

mod grant;
mod store;

pub use grant::{Capability, ConsentGrant};
pub use store::ConsentStore;
