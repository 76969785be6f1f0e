//! Material repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;

use super::MaterialStore;
use crate::models::{Material, NewMaterial};

/// Material repository
#[derive(Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

impl MaterialRepository {
    /// Create a new material repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaterialStore for MaterialRepository {
    async fn insert(&self, new_material: &NewMaterial) -> DatabaseResult<Material> {
        sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materials (uploader_id, uploader_name, original_filename, stored_filename, file_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, uploader_id, uploader_name, original_filename, stored_filename, file_url, created_at
            "#,
        )
        .bind(new_material.uploader_id)
        .bind(&new_material.uploader_name)
        .bind(&new_material.original_filename)
        .bind(&new_material.stored_filename)
        .bind(&new_material.file_url)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn all(&self) -> DatabaseResult<Vec<Material>> {
        sqlx::query_as::<_, Material>(
            r#"
            SELECT id, uploader_id, uploader_name, original_filename, stored_filename, file_url, created_at
            FROM materials
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }
}
