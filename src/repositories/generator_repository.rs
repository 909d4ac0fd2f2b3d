use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::generator_dto::{CreateGeneratorRequest, UpdateGeneratorRequest};
use crate::models::generator::Generator;
use crate::utils::errors::{conflict_error, map_unique_violation, not_found_error, AppError};

pub struct GeneratorRepository {
    pool: PgPool,
}

impl GeneratorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateGeneratorRequest) -> Result<Generator, AppError> {
        let kva = request.kva.trim().to_string();
        let generator = sqlx::query_as::<_, Generator>(
            r#"
            INSERT INTO generators (id, kva, name, image_url, description, base_price, price_per_additional_hour, price_per_hour, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&kva)
        .bind(request.name)
        .bind(request.image_url)
        .bind(request.description)
        .bind(request.base_price)
        .bind(request.price_per_additional_hour)
        .bind(request.price_per_hour)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || conflict_error("Generator", "kva", &kva)))?;

        Ok(generator)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Generator>, AppError> {
        let generator = sqlx::query_as::<_, Generator>("SELECT * FROM generators WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(generator)
    }

    pub async fn list(&self) -> Result<Vec<Generator>, AppError> {
        let generators = sqlx::query_as::<_, Generator>("SELECT * FROM generators ORDER BY base_price ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(generators)
    }

    pub async fn kva_exists(&self, kva: &str) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM generators WHERE kva = $1)")
            .bind(kva.trim())
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    pub async fn update(&self, id: Uuid, request: UpdateGeneratorRequest) -> Result<Generator, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Generator", &id.to_string()))?;

        let price = |new: Option<Decimal>, old: Decimal| new.unwrap_or(old);

        let generator = sqlx::query_as::<_, Generator>(
            r#"
            UPDATE generators
            SET kva = $2, name = $3, image_url = $4, description = $5,
                base_price = $6, price_per_additional_hour = $7, price_per_hour = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.kva.unwrap_or(current.kva))
        .bind(request.name.unwrap_or(current.name))
        .bind(request.image_url.or(current.image_url))
        .bind(request.description.or(current.description))
        .bind(price(request.base_price, current.base_price))
        .bind(price(request.price_per_additional_hour, current.price_per_additional_hour))
        .bind(price(request.price_per_hour, current.price_per_hour))
        .fetch_one(&self.pool)
        .await?;

        Ok(generator)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM generators WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Generator", &id.to_string()));
        }
        Ok(())
    }
}
