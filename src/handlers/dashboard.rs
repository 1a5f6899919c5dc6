use axum::{extract::State, Extension, Json};

use crate::{
    error::Result,
    models::{
        account::Role,
        activity::{Dashboard, SummaryCard},
        session::AuthContext,
    },
    services::dashboard::{dashboard_for, health_summary},
    state::AppState,
};

/// Returns the dashboard of the signed-in visitor.
pub async fn dashboard(Extension(context): Extension<AuthContext>) -> Json<Dashboard> {
    Json(dashboard_for(context.user()))
}

/// Returns the health summary. Patients only.
pub async fn health(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<Vec<SummaryCard>>> {
    state.guard.require_role(&context, Role::Patient)?;
    Ok(Json(health_summary()))
}
