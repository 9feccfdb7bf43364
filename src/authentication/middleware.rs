use crate::authentication::{AdminSession, SessionGate};
use crate::routes::ApiError;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{web, FromRequest, HttpMessage};
use actix_web_lab::middleware::Next;

/// Guards the admin scope: requests without a live session are answered with
/// 401 before any handler, and therefore any query, runs.
pub async fn reject_anonymous_admins(
    mut req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    // Extractors want an HttpRequest and a Payload, borrow them out of the
    // ServiceRequest for the duration of the extraction only
    let session = {
        let (http_req, payload) = req.parts_mut();
        AdminSession::from_request(http_req, payload).await?
    };

    let gate = req
        .app_data::<web::Data<SessionGate>>()
        .cloned()
        .ok_or_else(|| ApiError::Storage(anyhow::anyhow!("Session gate is not configured")))?;

    match gate.who_am_i(&session) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            Ok(next.call(req).await?)
        }
        Err(error) => {
            tracing::info!(error.cause_chain = ?error, "Rejected an anonymous admin request");
            Err(ApiError::Unauthorized("Unauthorized".into()).into())
        }
    }
}
