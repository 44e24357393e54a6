pub mod audit_log;
pub mod matches;
pub mod player;
pub mod set_score;
pub mod team;
pub mod tournament;
pub mod tournament_group;

pub use audit_log::{AuditAction, AuditLog};
pub use matches::Match;
pub use player::Player;
pub use set_score::SetScore;
pub use team::Team;
pub use tournament::{Tournament, TournamentStatus, TournamentType};
pub use tournament_group::TournamentGroup;
