//! Incremental pagination: page bookkeeping, next-offset arithmetic and the
//! guard that decides when another page may be requested.

mod page;
mod sequencer;
mod trigger;

pub use page::{FetchState, Page, PageCollection};
pub use sequencer::PageParamSequencer;
pub use trigger::{Decision, LoadTrigger, TriggerMode};
