//! Type-safe wrappers and enums for team-strength data.

pub mod ids;
pub mod parameter;
pub mod season;

pub use ids::{CompetitionId, FixtureId, TeamId};
pub use parameter::{Orientation, Parameter};
pub use season::Season;
