//! OpenAPI documentation for the mapping API.

use utoipa::OpenApi;

use crate::{api, errors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "docmap",
        description = "Link PDF documents to an ID number and serial number pair, and retrieve them by that pair."
    ),
    paths(
        api::handlers::mappings::get_mappings,
        api::handlers::mappings::upsert_mapping,
        api::handlers::mappings::edit_mapping,
    ),
    components(
        schemas(
            api::models::mappings::MappingResponse,
            api::models::mappings::MappingUpload,
            api::models::mappings::MappingEdit,
            errors::ErrorBody,
        )
    ),
    tags(
        (name = "mappings", description = "Document mappings keyed by (idNumber, serialNumber)")
    )
)]
pub struct ApiDoc;
