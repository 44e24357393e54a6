pub mod match_state;
pub mod points_sheet;
pub mod schedule;
pub mod set_rules;
pub mod standings;
