use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    middleware::Next,
    Error, HttpMessage,
};
use uuid::Uuid;

/// Logs who hit what, and raises refused access to warn level.
pub async fn security_logger_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let ip_address = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();
    let path = req.path().to_string();
    let method = req.method().to_string();

    let response = next.call(req).await?;
    let status = response.status();

    // Set by the auth extractor once a session has been accepted.
    let user = response
        .request()
        .extensions()
        .get::<Uuid>()
        .map_or_else(|| "anonymous".to_string(), Uuid::to_string);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        log::warn!(
            "Refused {} {} from {} ({}): {}",
            method,
            path,
            ip_address,
            user,
            status.as_u16()
        );
    } else {
        log::debug!(
            "{} {} from {} ({}): {}",
            method,
            path,
            ip_address,
            user,
            status.as_u16()
        );
    }

    Ok(response)
}
