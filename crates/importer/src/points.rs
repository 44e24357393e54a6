//! Offline application of player point sheets.

use std::path::{Path, PathBuf};

use sqlx::PgPool;
use storage::{
    dto::player::PointsImportSummary, repository::PlayerRepository,
    services::points_sheet::parse_points_sheet,
};

use crate::{ImporterError, Result};

pub struct PointsImporter<'a> {
    pool: &'a PgPool,
}

impl<'a> PointsImporter<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reads and applies one sheet. With `validate_only` the sheet is checked
    /// against the players table and nothing is written.
    pub async fn import_file(&self, path: &Path, validate_only: bool) -> Result<PointsImportSummary> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| ImporterError::io(path, e))?;

        let sheet = parse_points_sheet(content.as_slice())?;
        tracing::debug!(
            "Parsed {} rows into {} player deltas",
            sheet.rows_read,
            sheet.deltas.len()
        );

        let summary = PlayerRepository::new(self.pool)
            .import_points_sheet(&sheet, &path.display().to_string(), validate_only)
            .await?;
        Ok(summary)
    }
}

/// CSV files directly inside `directory` or one level below, sorted by path.
pub async fn find_sheets(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut sheets = Vec::new();
    let mut entries = tokio::fs::read_dir(directory)
        .await
        .map_err(|e| ImporterError::io(directory, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ImporterError::io(directory, e))?
    {
        let path = entry.path();
        if path.is_dir() {
            let mut sub_entries = tokio::fs::read_dir(&path)
                .await
                .map_err(|e| ImporterError::io(&path, e))?;
            while let Some(sub_entry) = sub_entries
                .next_entry()
                .await
                .map_err(|e| ImporterError::io(&path, e))?
            {
                let sub_path = sub_entry.path();
                if is_csv(&sub_path) {
                    sheets.push(sub_path);
                }
            }
        } else if is_csv(&path) {
            sheets.push(path);
        }
    }

    sheets.sort();
    Ok(sheets)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    use super::*;

    async fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("points-import-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        dir
    }

    #[tokio::test]
    async fn test_find_sheets_scans_one_level_deep() {
        let dir = scratch_dir().await;
        let week = dir.join("week-02");
        tokio::fs::create_dir_all(&week).await.unwrap();

        tokio::fs::write(dir.join("b.csv"), "player_id,points\n").await.unwrap();
        tokio::fs::write(dir.join("notes.txt"), "ignore me").await.unwrap();
        tokio::fs::write(week.join("a.CSV"), "player_id,points\n").await.unwrap();

        let found = find_sheets(&dir).await.unwrap();
        assert_eq!(found, vec![dir.join("b.csv"), week.join("a.CSV")]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_sheets_missing_directory() {
        let dir = std::env::temp_dir().join(format!("points-import-{}", Uuid::new_v4()));
        let err = find_sheets(&dir).await.unwrap_err();
        assert!(matches!(err, ImporterError::Io { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_before_database() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let importer = PointsImporter::new(&pool);

        let missing = std::env::temp_dir().join(format!("{}.csv", Uuid::new_v4()));
        let err = importer.import_file(&missing, true).await.unwrap_err();
        assert!(err.to_string().contains(&missing.display().to_string()));
    }

    #[tokio::test]
    async fn test_malformed_sheet_fails_before_database() {
        let dir = scratch_dir().await;
        let file = dir.join("bad.csv");
        tokio::fs::write(&file, "player_id,points\nnot-a-uuid,3\n").await.unwrap();

        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let err = PointsImporter::new(&pool)
            .import_file(&file, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ImporterError::SheetError(_)));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
