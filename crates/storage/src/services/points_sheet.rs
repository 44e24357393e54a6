//! Parsing of player point sheets (CSV with a player id and a points column).

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const PLAYER_COLUMNS: &[&str] = &["player_id", "ID_Jugador"];
const POINTS_COLUMNS: &[&str] = &["points", "Puntos"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Error)]
pub enum PointsSheetError {
    #[error("Failed to read points sheet: {0}")]
    Csv(#[from] csv::Error),

    #[error("Points sheet is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("Points sheet has no data rows")]
    Empty,

    #[error("Points sheet has {} invalid row(s): {}", .0.len(), join_rows(.0))]
    InvalidRows(Vec<RowError>),

    #[error("Point total for player {0} is out of range")]
    Overflow(Uuid),
}

fn join_rows(rows: &[RowError]) -> String {
    rows.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Deserialize)]
struct PointsRow {
    #[serde(alias = "ID_Jugador")]
    player_id: Uuid,
    #[serde(alias = "Puntos")]
    points: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointDelta {
    pub player_id: Uuid,
    pub points: i32,
}

/// Summed deltas, one per player, ordered by player id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsSheet {
    pub rows_read: usize,
    pub deltas: Vec<PointDelta>,
}

impl PointsSheet {
    pub fn player_ids(&self) -> Vec<Uuid> {
        self.deltas.iter().map(|d| d.player_id).collect()
    }
}

fn require_column(
    headers: &csv::StringRecord,
    names: &[&str],
    canonical: &'static str,
) -> Result<(), PointsSheetError> {
    if headers.iter().any(|h| names.contains(&h)) {
        Ok(())
    } else {
        Err(PointsSheetError::MissingColumn(canonical))
    }
}

/// Reads a whole sheet. Any unparsable row fails the sheet, with every bad line reported.
pub fn parse_points_sheet<R: Read>(input: R) -> Result<PointsSheet, PointsSheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    require_column(&headers, PLAYER_COLUMNS, "player_id")?;
    require_column(&headers, POINTS_COLUMNS, "points")?;

    let mut totals: BTreeMap<Uuid, i32> = BTreeMap::new();
    let mut failures = Vec::new();
    let mut rows_read = 0;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }
        rows_read += 1;

        match record.deserialize::<PointsRow>(Some(&headers)) {
            Ok(row) => {
                let total = totals.entry(row.player_id).or_insert(0);
                *total = total
                    .checked_add(row.points)
                    .ok_or(PointsSheetError::Overflow(row.player_id))?;
            }
            Err(e) => failures.push(RowError {
                line,
                message: e.to_string(),
            }),
        }
    }

    if !failures.is_empty() {
        return Err(PointsSheetError::InvalidRows(failures));
    }
    if rows_read == 0 {
        return Err(PointsSheetError::Empty);
    }

    let deltas = totals
        .into_iter()
        .map(|(player_id, points)| PointDelta { player_id, points })
        .collect();

    Ok(PointsSheet { rows_read, deltas })
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "6f0f7a57-3c2f-4f43-9a55-2d1b7f1c9a01";
    const B: &str = "0b6a1f93-6a52-4d2e-8e0e-55c5c7f0b002";

    #[test]
    fn test_sums_points_per_player() {
        let csv = format!("player_id,points\n{A},3\n{B},1\n{A},4\n");
        let sheet = parse_points_sheet(csv.as_bytes()).unwrap();

        assert_eq!(sheet.rows_read, 3);
        assert_eq!(sheet.deltas.len(), 2);

        let a = sheet
            .deltas
            .iter()
            .find(|d| d.player_id.to_string() == A)
            .unwrap();
        assert_eq!(a.points, 7);
    }

    #[test]
    fn test_accepts_spanish_headers_and_extra_columns() {
        let csv = format!("Nombre,ID_Jugador,Puntos\nAna, {A} , 5\n");
        let sheet = parse_points_sheet(csv.as_bytes()).unwrap();
        assert_eq!(sheet.deltas, vec![PointDelta {
            player_id: A.parse().unwrap(),
            points: 5,
        }]);
    }

    #[test]
    fn test_negative_corrections_are_allowed() {
        let csv = format!("player_id,points\n{A},10\n{A},-4\n");
        let sheet = parse_points_sheet(csv.as_bytes()).unwrap();
        assert_eq!(sheet.deltas[0].points, 6);
    }

    #[test]
    fn test_missing_column() {
        let result = parse_points_sheet("player_id,score\n".as_bytes());
        assert!(matches!(result, Err(PointsSheetError::MissingColumn("points"))));
    }

    #[test]
    fn test_reports_every_bad_line() {
        let csv = format!("player_id,points\n{A},2\nnot-a-uuid,1\n{B},many\n");
        match parse_points_sheet(csv.as_bytes()) {
            Err(PointsSheetError::InvalidRows(rows)) => {
                let lines: Vec<u64> = rows.iter().map(|r| r.line).collect();
                assert_eq!(lines, vec![3, 4]);
            }
            other => panic!("expected invalid rows, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_sheet() {
        let result = parse_points_sheet("player_id,points\n\n".as_bytes());
        assert!(matches!(result, Err(PointsSheetError::Empty)));
    }
}
