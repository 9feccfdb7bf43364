use crate::authentication::{AdminIdentity, AdminSession, SessionGate};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};

#[derive(serde::Serialize)]
struct CurrentUser {
    user: AdminIdentity,
}

#[tracing::instrument(name = "Get the current administrator", skip_all)]
pub async fn who_am_i(
    gate: web::Data<SessionGate>,
    session: AdminSession,
) -> Result<HttpResponse, ApiError> {
    let user = gate.who_am_i(&session)?;
    Ok(HttpResponse::Ok().json(CurrentUser { user }))
}
