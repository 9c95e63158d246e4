//! Campaign roster resolution.
//!
//! One call to the character API per cycle turns the seed character id into
//! the campaign name and its members; [`build_roster`] then produces the
//! immutable, deduplicated list of characters the cycle fetches.

pub mod errors;
pub mod handler;
pub mod operations;
pub mod types;

pub use errors::RosterError;
pub use handler::{ApiRosterResolver, RosterSource};
pub use operations::{build_roster, campaign_from_payload};
pub use types::{CampaignInfo, Roster, RosterMember};
