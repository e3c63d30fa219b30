use crate::routes::{animate, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "morph-server",
    description = "Animation relay API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(animate::AnimateApi::openapi());
    root
}
