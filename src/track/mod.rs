//! # Track Module
//!
//! Aircraft track records and the double-buffered track tables.

pub mod callsign;
pub mod store;
pub mod table;

pub use callsign::{Callsign, CALLSIGN_LEN};
pub use store::{publish_into, CurrentView, PublishReport, TrackStore};
pub use table::{ScreenPoint, TableFull, TrackRecord, TrackTable, MAX_TRACKS};
