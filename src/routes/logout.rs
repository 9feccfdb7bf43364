use crate::authentication::AdminSession;
use crate::routes::Message;
use actix_web::HttpResponse;

#[tracing::instrument(name = "Logout", skip_all)]
pub async fn logout(session: AdminSession) -> HttpResponse {
    session.logout();
    HttpResponse::Ok().json(Message {
        message: "Logged out",
    })
}
