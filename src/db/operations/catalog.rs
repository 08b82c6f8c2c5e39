use crate::db::{error::Result, types::ModelRoute};
use crate::models::ModelInfo;
use deadpool_postgres::Pool;
use uuid::Uuid;

/// List all available models
pub async fn list_models(pool: &Pool) -> Result<Vec<ModelInfo>> {
    let conn = pool.get().await?;

    let rows = conn
        .query(
            "SELECT model_id, model_name FROM models ORDER BY model_name",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| ModelInfo {
            model_id: row.get("model_id"),
            model_name: row.get("model_name"),
        })
        .collect())
}

/// Name and provider service of a model, or None if the id is unknown
pub async fn get_model_name_and_service(pool: &Pool, model_id: Uuid) -> Result<Option<ModelRoute>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "SELECT model_name, service FROM models WHERE model_id = $1",
            &[&model_id],
        )
        .await?;

    Ok(row.map(|row| ModelRoute {
        model_name: row.get("model_name"),
        service: row.get("service"),
    }))
}
