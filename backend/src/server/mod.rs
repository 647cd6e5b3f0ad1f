//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::{ServiceContext, build_http_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use tutorhub::Trace;
#[cfg(debug_assertions)]
use tutorhub::doc::ApiDoc;
use tutorhub::inbound::http::health::{HealthState, live, ready};
use tutorhub::inbound::http::state::HttpState;
use tutorhub::inbound::http::{
    coursework, dropouts, dues, leaderboard, notifications, payments, settings, students,
};
use tutorhub::inbound::ws;
use tutorhub::inbound::ws::state::WsState;
use tutorhub::outbound::realtime::BroadcastHub;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

/// Register every REST handler under the current scope.
fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(dues::assign_monthly_dues)
        .service(dues::add_dues)
        .service(dues::update_due)
        .service(dues::delete_due)
        .service(dues::toggle_due_paid)
        .service(dues::fee_status)
        .service(payments::pending_payments)
        .service(payments::approve_payment)
        .service(payments::reject_payment)
        .service(payments::confirm_cash_payment)
        .service(payments::submit_payment)
        .service(students::register_student)
        .service(students::remove_student)
        .service(students::class_roster)
        .service(students::resequence_class)
        .service(dropouts::list_dropouts)
        .service(dropouts::approve_dropout)
        .service(dropouts::reject_dropout)
        .service(dropouts::request_dropout)
        .service(notifications::broadcast)
        .service(notifications::purge_expired)
        .service(notifications::notifications_for)
        .service(notifications::mark_read)
        .service(coursework::create_test)
        .service(coursework::record_mark)
        .service(coursework::delete_mark)
        .service(coursework::publish_pdf)
        .service(coursework::publish_resource)
        .service(leaderboard::classes_with_data)
        .service(leaderboard::leaderboard_for_class)
        .service(leaderboard::leaderboard_position)
        .service(settings::get_monthly_due)
        .service(settings::set_monthly_due)
        .service(settings::get_upi_settings)
        .service(settings::update_upi_settings)
        .service(settings::payment_details);
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Services publish real-time events to a single [`BroadcastHub`] that the
/// WebSocket endpoint subscribes to, so both must be built here together.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let hub = BroadcastHub::default();
    let ctx = ServiceContext {
        publisher: Arc::new(hub.clone()),
        clock: Arc::new(mockable::DefaultClock),
        utc_offset: config.utc_offset,
        retention_days: config.retention_days,
    };
    let http_state = build_http_state(&config, ctx);
    let ws_state = web::Data::new(WsState::new(hub, config.allowed_origins.clone()));
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
