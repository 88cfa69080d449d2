pub mod household;
pub mod snapshot;
pub mod summary;

pub use household::{Account, Frequency, Goal, Investment, Member, Mortgage, Outgoing};
pub use snapshot::{Snapshot, DEFAULT_OUTGOING_CATEGORIES};
pub use summary::HouseholdSummary;
