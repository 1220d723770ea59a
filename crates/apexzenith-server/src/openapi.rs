//! OpenAPI documentation for the dashboard API

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ApexZenith Daemon API",
        description = "Diagnostics dashboard: submit a problem, get the suggested fix, review session history."
    ),
    paths(
        crate::routes::diagnose::submit_diagnosis,
        crate::routes::session::get_session,
        crate::routes::overview::get_overview,
        crate::routes::health::health_check,
    ),
    components(schemas(
        apexzenith::diagnosis::Diagnosis,
        apexzenith::diagnosis::DiagnosisRecord,
        apexzenith::session::SessionSnapshot,
        crate::routes::diagnose::DiagnoseResponse,
        crate::routes::session::SessionResponse,
        crate::routes::overview::MetricCard,
        crate::routes::overview::OverviewResponse,
    )),
    tags(
        (name = "diagnosis", description = "Diagnose flow and session state"),
        (name = "system", description = "Overview metrics and health")
    )
)]
pub struct ApiDoc;
