//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use staka_core::models;

/// Registers the admin bearer scheme referenced by the admin paths.
struct AdminBearerAddon;

impl Modify for AdminBearerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staka Livres API",
        version = "0.1.0",
        description = "Public tariff catalog and admin back-office endpoints. Admin routes require `Authorization: Bearer <ADMIN_API_KEY>`."
    ),
    paths(
        // Public
        handlers::tariffs::list_public_tariffs,
        // Admin tariffs
        handlers::admin_tariffs::list_tariffs,
        handlers::admin_tariffs::get_tariff,
        handlers::admin_tariffs::create_tariff,
        handlers::admin_tariffs::update_tariff,
        handlers::admin_tariffs::toggle_tariff,
        handlers::admin_tariffs::delete_tariff,
        // Files
        handlers::files::upload_admin_file,
    ),
    components(
        schemas(
            models::PublicTariff,
            models::AdminTariff,
            models::CreateTariffRequest,
            models::UpdateTariffRequest,
            models::StoredFile,
            handlers::tariffs::PublicTariffsResponse,
            handlers::tariffs::SecurityInfo,
            error::ErrorResponse,
        )
    ),
    modifiers(&AdminBearerAddon),
    tags(
        (name = "tarifs", description = "Public tariff catalog"),
        (name = "admin", description = "Tariff management and file uploads for the Staka team")
    )
)]
pub struct ApiDoc;
