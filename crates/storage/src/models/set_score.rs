use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::services::set_rules::SetPoints;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SetScore {
    pub match_id: Uuid,
    pub set_number: i32,
    pub local_points: i32,
    pub visitor_points: i32,
}

pub(crate) fn to_u32(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| StorageError::Corrupt(format!("negative value {} in {}", value, column)))
}

impl SetScore {
    pub fn to_points(&self) -> Result<SetPoints> {
        Ok(SetPoints::new(
            to_u32(self.set_number, "set_scores.set_number")?,
            to_u32(self.local_points, "set_scores.local_points")?,
            to_u32(self.visitor_points, "set_scores.visitor_points")?,
        ))
    }
}
