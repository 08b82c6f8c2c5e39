// GET / handler

use serde_json::json;

pub async fn root_handler() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&json!({ "Labmise Backend V1": "Online 👍" })))
}
