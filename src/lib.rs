pub mod config;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod resolver;
pub mod roster;
pub mod routes;
pub mod source;

pub use models::{Curriculum, NextActivityRef, ProgressSummary, RosterEntry, RosterRow};
pub use normalize::normalize;
pub use progress::summarize;
pub use resolver::resolve_next;
pub use roster::{load_roster, reduce_roster};
pub use source::{CurriculumSource, HttpCurriculumSource, SourceError};
