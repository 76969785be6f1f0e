//! Material service: metadata for uploaded study files

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::HubResult,
    models::{Material, NewMaterial},
    repositories::MaterialStore,
};

#[derive(Clone)]
pub struct MaterialService {
    materials: Arc<dyn MaterialStore>,
}

impl MaterialService {
    pub fn new(materials: Arc<dyn MaterialStore>) -> Self {
        Self { materials }
    }

    pub async fn save_material(
        &self,
        uploader_id: Uuid,
        uploader_name: &str,
        original_filename: &str,
        stored_filename: &str,
        file_url: &str,
    ) -> HubResult<Material> {
        let material = self
            .materials
            .insert(&NewMaterial {
                uploader_id,
                uploader_name: uploader_name.to_string(),
                original_filename: original_filename.to_string(),
                stored_filename: stored_filename.to_string(),
                file_url: file_url.to_string(),
            })
            .await?;

        info!(
            "Recorded material {} ({}) from {}",
            material.id, material.stored_filename, uploader_id
        );
        Ok(material)
    }

    /// Every material, newest first.
    pub async fn list_materials(&self) -> HubResult<Vec<Material>> {
        Ok(self.materials.all().await?)
    }
}
