//! Dataset metadata repository

use super::repo::Database;
use crate::error::{Error, Result};
use crate::types::{DatasetMetadata, GroupCount, NewDataset, RowsAffected};
use rusqlite::{params, OptionalExtension, Row};

const SELECT_DATASET: &str = "SELECT id, dataset_name, category, source, last_updated, \
     record_count, file_size_mb, created_at FROM datasets_metadata";

const INSERT_DATASET: &str = r#"
    INSERT INTO datasets_metadata (dataset_name, category, source, last_updated, record_count, file_size_mb)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

impl Database {
    /// Insert a dataset and return its id
    pub fn insert_dataset(&self, dataset: &NewDataset) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            INSERT_DATASET,
            params![
                dataset.dataset_name,
                dataset.category,
                dataset.source,
                dataset.last_updated,
                dataset.record_count,
                dataset.file_size_mb,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert many datasets in one transaction, returning how many were written
    pub fn insert_datasets(&self, datasets: &[NewDataset]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(INSERT_DATASET)?;
            for dataset in datasets {
                stmt.execute(params![
                    dataset.dataset_name,
                    dataset.category,
                    dataset.source,
                    dataset.last_updated,
                    dataset.record_count,
                    dataset.file_size_mb,
                ])?;
            }
        }

        tx.commit()?;
        Ok(datasets.len())
    }

    /// All datasets, newest id first
    pub fn list_datasets(&self) -> Result<Vec<DatasetMetadata>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{SELECT_DATASET} ORDER BY id DESC"))?;

        let datasets = stmt
            .query_map([], Self::row_to_dataset)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(datasets)
    }

    /// Get a dataset by id
    pub fn get_dataset(&self, id: i64) -> Result<Option<DatasetMetadata>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("{SELECT_DATASET} WHERE id = ?"),
            [id],
            Self::row_to_dataset,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Get a dataset by its unique name
    pub fn get_dataset_by_name(&self, name: &str) -> Result<Option<DatasetMetadata>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("{SELECT_DATASET} WHERE dataset_name = ?"),
            [name],
            Self::row_to_dataset,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Replace every editable column of a dataset
    pub fn update_dataset(&self, id: i64, dataset: &NewDataset) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute(
            r#"
            UPDATE datasets_metadata
            SET dataset_name = ?1,
                category = ?2,
                source = ?3,
                last_updated = ?4,
                record_count = ?5,
                file_size_mb = ?6
            WHERE id = ?7
            "#,
            params![
                dataset.dataset_name,
                dataset.category,
                dataset.source,
                dataset.last_updated,
                dataset.record_count,
                dataset.file_size_mb,
                id,
            ],
        )?;
        Ok(RowsAffected(n))
    }

    /// Delete a dataset by id
    pub fn delete_dataset(&self, id: i64) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM datasets_metadata WHERE id = ?", [id])?;
        Ok(RowsAffected(n))
    }

    /// Dataset counts grouped by category (NULL categories form one group)
    pub fn count_datasets_by_category(&self) -> Result<Vec<GroupCount>> {
        self.query_group_counts(
            r#"
            SELECT category, COUNT(*) AS count
            FROM datasets_metadata
            GROUP BY category
            ORDER BY count DESC
            "#,
            [],
        )
    }

    /// Largest datasets by record count, as (name, record_count) pairs.
    ///
    /// Datasets without a record count are left out.
    pub fn top_datasets_by_record_count(&self, limit: usize) -> Result<Vec<GroupCount>> {
        self.query_group_counts(
            r#"
            SELECT dataset_name, record_count
            FROM datasets_metadata
            WHERE record_count IS NOT NULL
            ORDER BY record_count DESC
            LIMIT ?1
            "#,
            [limit as i64],
        )
    }

    fn row_to_dataset(row: &Row) -> rusqlite::Result<DatasetMetadata> {
        Ok(DatasetMetadata {
            id: row.get("id")?,
            dataset_name: row.get("dataset_name")?,
            category: row.get("category")?,
            source: row.get("source")?,
            last_updated: row.get("last_updated")?,
            record_count: row.get("record_count")?,
            file_size_mb: row.get("file_size_mb")?,
            created_at: row.get("created_at")?,
        })
    }
}
