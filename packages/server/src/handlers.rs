//! HTTP handler functions for the parcel subgraph.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use parcel_gis_server_models::ApiHealth;

use crate::AppState;
use crate::schema::RequestContext;

/// `GET /health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.store_kind.to_string(),
    })
}

/// `POST /graphql`
///
/// Executes a GraphQL request with the caller's [`RequestContext`]
/// attached.
pub async fn graphql(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let context = request_context(&http_req);
    state.schema.execute(req.into_inner().data(context)).await.into()
}

/// `GET /graphql`
///
/// Serves the `GraphiQL` explorer pointed at this endpoint.
pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

fn request_context(req: &HttpRequest) -> RequestContext {
    RequestContext {
        authorization: req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string),
    }
}
