pub mod audit_log;
pub mod matches;
pub mod player;
pub mod team;
pub mod tournament;

pub use audit_log::AuditLogRepository;
pub use matches::MatchRepository;
pub use player::PlayerRepository;
pub use team::TeamRepository;
pub use tournament::TournamentRepository;
