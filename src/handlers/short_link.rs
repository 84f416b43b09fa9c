use actix_web::{http::header::LOCATION, web, HttpResponse, Responder};
use log::{debug, info};
use validator::Validate;

use crate::{
    models::{GenerateResponseDto, ShortenRequestDto, ShortenResponseDto},
    services::{ShortLinkService, ShortLinkServiceTrait},
    types::Result,
};

/// Shorten URL route handler
pub async fn shorten_handler(
    dto: web::Json<ShortenRequestDto>,
    service: web::Data<ShortLinkService>,
) -> Result<impl Responder> {
    let dto = dto.into_inner();
    dto.validate()?;

    let ctx = service.request_context();
    let link = service.create(&ctx, &dto.url, dto.expires_in).await?;

    Ok(HttpResponse::Ok().json(ShortenResponseDto::from_link(link, service.base_url())))
}

/// Generate code route handler
pub async fn generate_handler(service: web::Data<ShortLinkService>) -> Result<impl Responder> {
    let short_code = service.generate_code()?;
    Ok(HttpResponse::Ok().json(GenerateResponseDto { short_code }))
}

/// Stats route handler
pub async fn stats_handler(
    path: web::Path<String>,
    service: web::Data<ShortLinkService>,
) -> Result<impl Responder> {
    let ctx = service.request_context();
    let link = service.get_stats(&ctx, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(link))
}

/// Redirect route handler
pub async fn redirect_handler(
    path: web::Path<String>,
    service: web::Data<ShortLinkService>,
) -> Result<impl Responder> {
    let short_code = path.into_inner();
    debug!("Redirect requested for code: {}", short_code);

    let ctx = service.request_context();
    let original_url = service.resolve(&ctx, &short_code).await?;

    info!("Redirecting '{}' to '{}'", short_code, original_url);

    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((LOCATION, original_url))
        .finish())
}
