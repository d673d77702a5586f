use utoipa::OpenApi;

use crate::apps::{AppData, AppName, AppWithData};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Simple Datastore API",
        description = "A simple REST datastore API",
        version = "1.0"
    ),
    paths(
        crate::routes::health,
        crate::routes::schema,
        crate::apps::list_apps,
        crate::apps::get_app,
        crate::apps::put_app,
        crate::apps::delete_app,
    ),
    components(schemas(AppName, AppData, AppWithData)),
    tags(
        (name = "apps", description = "App data related operations"),
        (name = "schema", description = "This API's schema operations"),
        (name = "health")
    )
)]
pub struct ApiDoc;
