use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::addon_dto::{CreateAddonRequest, UpdateAddonRequest};
use crate::models::addon::Addon;
use crate::utils::errors::{not_found_error, AppError};

pub struct AddonRepository {
    pool: PgPool,
}

impl AddonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateAddonRequest) -> Result<Addon, AppError> {
        let addon = sqlx::query_as::<_, Addon>(
            r#"
            INSERT INTO addons (id, name, description, price, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.name)
        .bind(request.description)
        .bind(request.price)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(addon)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Addon>, AppError> {
        let addon = sqlx::query_as::<_, Addon>("SELECT * FROM addons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(addon)
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Addon>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let addons = sqlx::query_as::<_, Addon>("SELECT * FROM addons WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(addons)
    }

    pub async fn list(&self) -> Result<Vec<Addon>, AppError> {
        let addons = sqlx::query_as::<_, Addon>("SELECT * FROM addons ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(addons)
    }

    pub async fn update(&self, id: Uuid, request: UpdateAddonRequest) -> Result<Addon, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Addon", &id.to_string()))?;

        let addon = sqlx::query_as::<_, Addon>(
            "UPDATE addons SET name = $2, description = $3, price = $4 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(request.name.unwrap_or(current.name))
        .bind(request.description.or(current.description))
        .bind(request.price.unwrap_or(current.price))
        .fetch_one(&self.pool)
        .await?;

        Ok(addon)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM addons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Addon", &id.to_string()));
        }
        Ok(())
    }
}
