mod catalog;
mod error;
pub mod query;
mod roster;
mod share;
mod store;
mod types;
pub mod well_known;

pub use catalog::{CachePolicy, CatalogClient, CatalogSource, ClientConfig, FileCatalog, RequestKind};
pub use error::{CoreError, CoreErrorCode, RosterRejection};
pub use query::{filter, sort};
pub use roster::{Roster, RosterSession};
pub use share::{QR_SIZE_PX, ShareCode, SharePayload, TEAM_PARAM};
pub use store::{JsonFileStore, MemoryStore, PersistedRoster, RosterStore};
pub use types::{FilterCriteria, RosterEntry, SortKey, StatSummary, TeamSummary};
pub use well_known::{MAX_TEAM_SIZE, STORAGE_NAMESPACE, TYRADEX_API_BASE};
