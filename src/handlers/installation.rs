//! Installation wizard: database connection

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::error::AppResult;
use crate::core::settings::Scope;
use crate::core::validation::filters::setting_value;
use crate::core::validation::{DatabaseEnvironmentRequest, Validated};
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionQuery {
    pub connection: String,
}

/// Prefilled form values for a connection type
pub fn database_defaults(connection: &str, database_path: &str) -> Value {
    match connection {
        "sqlite" => json!({
            "database_connection": connection,
            "database_name": format!("{}/database.sqlite", database_path.trim_end_matches('/')),
        }),
        "pgsql" => json!({
            "database_connection": connection,
            "database_host": "127.0.0.1",
            "database_port": 5432,
        }),
        "mysql" => json!({
            "database_connection": connection,
            "database_host": "127.0.0.1",
            "database_port": 3306,
        }),
        _ => json!({}),
    }
}

pub async fn get_database_config(
    State(state): State<AppState>,
    Query(query): Query<ConnectionQuery>,
) -> Json<Value> {
    let config = database_defaults(&query.connection, state.config.database_path());
    Json(json!({ "config": config, "success": true }))
}

pub async fn save_database_config(
    State(state): State<AppState>,
    Validated(payload, _): Validated<DatabaseEnvironmentRequest>,
) -> AppResult<Json<Value>> {
    let settings = payload
        .iter()
        .map(|(key, value)| (key.clone(), setting_value(value)))
        .collect();
    state.settings.set_settings(&settings, Scope::Global).await?;

    tracing::info!(connection = ?payload.get("database_connection"), "database configured");
    Ok(Json(json!({
        "success": true,
        "message": "Database configured successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_defaults() {
        assert_eq!(
            database_defaults("sqlite", "/srv/app/database/"),
            json!({
                "database_connection": "sqlite",
                "database_name": "/srv/app/database/database.sqlite"
            })
        );
        assert_eq!(database_defaults("pgsql", "db")["database_port"], json!(5432));
        assert_eq!(database_defaults("mysql", "db")["database_port"], json!(3306));
        assert_eq!(database_defaults("sqlsrv", "db"), json!({}));
        assert_eq!(database_defaults("", "db"), json!({}));
    }
}
