use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::api::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::signup::signup,
        handlers::login::login,
        handlers::reset::start,
        handlers::reset::verify,
        handlers::reset::finish,
        handlers::session::session,
        handlers::chat::chat,
    ),
    components(schemas(
        handlers::health::Health,
        handlers::signup::UserSignup,
        handlers::login::UserLogin,
        handlers::reset::ResetStart,
        handlers::reset::SecurityQuestion,
        handlers::reset::ResetVerify,
        handlers::reset::ResetTicket,
        handlers::reset::ResetFinish,
        handlers::session::SessionInfo,
        handlers::chat::ChatRequest,
        handlers::chat::ChatReply,
        crate::chat::ChatMessage,
        crate::chat::Role,
        crate::auth::Claims,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service and database health"),
        (name = "user", description = "Account signup and login"),
        (name = "reset", description = "Security-question password recovery"),
        (name = "auth", description = "Session token introspection"),
        (name = "chat", description = "Authenticated assistant chat"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
