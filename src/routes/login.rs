use crate::authentication::{AdminIdentity, AdminSession, Credentials, SessionGate};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};
use anyhow::Context;

#[derive(serde::Serialize)]
struct LoginResponse {
    message: &'static str,
    user: AdminIdentity,
}

#[tracing::instrument(
    name = "Login an administrator",
    skip(credentials, gate, session),
    fields(username = %credentials.username)
)]
pub async fn login(
    web::Json(credentials): web::Json<Credentials>,
    gate: web::Data<SessionGate>,
    session: AdminSession,
) -> Result<HttpResponse, ApiError> {
    let ticket = gate.login(credentials).await?;

    // New session id on privilege change, a pre-login id must not carry over
    session.renew();
    session
        .insert_ticket(&ticket)
        .context("Failed to store the session ticket")?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful",
        user: ticket.identity,
    }))
}
