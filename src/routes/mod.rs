use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{
    self, auth, dashboard, messages, profiles, rentals, roadside, routes, schedules, taxi_ranks,
    tenants, tenders, tracking_devices, trips, users, vehicles,
};
use crate::middleware::auth::{auth_middleware, require_admin, require_manager};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_user_governor, RateLimitTier};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let public_governor = create_public_governor();

    // Public routes (IP rate limited)
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/taxi-ranks/nearby", get(taxi_ranks::nearby))
        .layer(public_governor);

    // Rank operations: marshals and managers working the rank floor
    let operations_routes = Router::new()
        .route("/taxi-ranks", get(taxi_ranks::list_taxi_ranks).post(taxi_ranks::create_taxi_rank))
        .route(
            "/taxi-ranks/{id}",
            get(taxi_ranks::get_taxi_rank)
                .put(taxi_ranks::update_taxi_rank)
                .delete(taxi_ranks::delete_taxi_rank),
        )
        .route(
            "/taxi-ranks/{id}/associations",
            get(taxi_ranks::list_associations).post(taxi_ranks::associate_tenant),
        )
        .route("/taxi-ranks/{id}/associations/{tenant_id}", delete(taxi_ranks::dissociate_tenant))
        .route(
            "/taxi-ranks/{id}/associations/{tenant_id}/primary",
            put(taxi_ranks::set_primary_tenant),
        )
        .route(
            "/taxi-ranks/{id}/vehicles",
            get(taxi_ranks::list_vehicles).post(taxi_ranks::assign_vehicle),
        )
        .route("/taxi-ranks/{id}/vehicles/{vehicle_id}", delete(taxi_ranks::unassign_vehicle))
        .route("/taxi-ranks/{id}/routes", get(routes::list_for_rank))
        .route("/taxi-ranks/{id}/trips", get(trips::list_for_rank))
        .route("/taxi-ranks/{id}/summary", get(dashboard::rank_daily_summary))
        // Routes and schedules
        .route("/routes", post(routes::create_route))
        .route(
            "/routes/{id}",
            get(routes::get_route).put(routes::update_route).delete(routes::delete_route),
        )
        .route("/routes/{id}/vehicles", get(routes::list_assignments).post(routes::assign_vehicle))
        .route("/routes/{id}/vehicles/{vehicle_id}", delete(routes::unassign_vehicle))
        .route("/routes/{id}/schedules", get(schedules::list_for_route))
        .route("/schedules", post(schedules::create_schedule))
        .route(
            "/schedules/{id}",
            put(schedules::update_schedule).delete(schedules::delete_schedule),
        )
        // Trips and boarding
        .route("/trips", post(trips::create_trip))
        .route("/trips/{id}", get(trips::get_trip).delete(trips::delete_trip))
        .route("/trips/{id}/status", put(trips::update_status))
        .route("/trips/{id}/passengers", get(trips::list_passengers).post(trips::add_passenger))
        .route("/trips/{id}/passengers/{passenger_id}", delete(trips::remove_passenger))
        .route("/trips/{id}/summary", get(trips::summary))
        .layer(create_user_governor(RateLimitTier::Operations))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Everything else a signed-in user does
    let member_routes = Router::new()
        .route("/me", get(users::me))
        .route(
            "/users/{id}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/users/{id}/active", put(users::set_active))
        .route("/users/{id}/profile", get(profiles::get_profile))
        .route("/users/{id}/profile/owner", put(profiles::upsert_owner))
        .route("/users/{id}/profile/driver", put(profiles::upsert_driver))
        .route("/users/{id}/profile/staff", put(profiles::upsert_staff))
        .route("/users/{id}/profile/marshal", put(profiles::upsert_marshal))
        .route("/users/{id}/profile/service-provider", put(profiles::upsert_service_provider))
        .route("/tenants/{id}", get(tenants::get_tenant))
        .route("/tenants/{id}/taxi-ranks", get(taxi_ranks::list_tenant_ranks))
        // Fleet
        .route("/vehicles", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route(
            "/vehicles/{id}",
            get(vehicles::get_vehicle)
                .put(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        .route(
            "/vehicles/{id}/documents",
            get(vehicles::list_documents).post(vehicles::add_document),
        )
        .route("/vehicles/{id}/documents/{document_id}", delete(vehicles::delete_document))
        .route("/vehicles/{id}/earnings", get(vehicles::list_earnings).post(vehicles::add_earning))
        .route("/vehicles/{id}/expenses", get(vehicles::list_expenses).post(vehicles::add_expense))
        .route("/vehicles/{id}/financial-summary", get(vehicles::financial_summary))
        // Rentals
        .route(
            "/rentals/requests",
            get(rentals::list_open_requests).post(rentals::create_request),
        )
        .route("/rentals/requests/{id}", get(rentals::get_request))
        .route("/rentals/requests/{id}/close", put(rentals::close_request))
        .route(
            "/rentals/requests/{id}/offers",
            get(rentals::list_offers).post(rentals::submit_offer),
        )
        .route("/rentals/offers/{id}/accept", put(rentals::accept_offer))
        .route("/rentals/offers/{id}/reject", put(rentals::reject_offer))
        .route("/rentals/bookings", get(rentals::list_bookings))
        .route("/rentals/bookings/{id}/status", put(rentals::update_booking_status))
        // Messages
        .route("/messages", get(messages::inbox).post(messages::send))
        .route("/messages/sent", get(messages::outbox))
        .route("/messages/unread-count", get(messages::unread_count))
        .route("/messages/{id}", get(messages::get_message).delete(messages::delete_message))
        .route("/messages/{id}/read", put(messages::mark_read))
        // Tenders
        .route("/tenders", get(tenders::list_tenders).post(tenders::create_tender))
        .route("/tenders/{id}", get(tenders::get_tender))
        .route("/tenders/{id}/status", put(tenders::update_status))
        .route(
            "/tenders/{id}/applications",
            get(tenders::list_applications).post(tenders::apply),
        )
        .route("/tender-applications/{id}/decision", put(tenders::decide_application))
        // Service marketplace
        .route(
            "/tracking-devices/requests",
            get(tracking_devices::list_requests).post(tracking_devices::create_request),
        )
        .route(
            "/tracking-devices/requests/{id}/offers",
            get(tracking_devices::list_offers).post(tracking_devices::submit_offer),
        )
        .route("/tracking-devices/offers/{id}/accept", put(tracking_devices::accept_offer))
        .route("/roadside", get(roadside::list_mine).post(roadside::create_request))
        .route("/roadside/open", get(roadside::list_open))
        .route("/roadside/{id}/assign", put(roadside::assign_provider))
        .route("/roadside/{id}/status", put(roadside::update_status))
        .layer(create_user_governor(RateLimitTier::Standard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Tenant managers (admin, staff, rank admins)
    let manager_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .layer(create_user_governor(RateLimitTier::Standard))
        .layer(middleware::from_fn(require_manager))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role), no per-user limit
    let admin_routes = Router::new()
        .route("/tenants", get(tenants::list_tenants).post(tenants::create_tenant))
        .route(
            "/tenants/{id}",
            put(tenants::update_tenant).delete(tenants::delete_tenant),
        )
        .route("/dashboard", get(dashboard::admin_overview))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .merge(auth_routes)
        .merge(operations_routes)
        .merge(member_routes)
        .merge(manager_routes)
        .nest("/admin", admin_routes);

    Router::new().nest("/api", api).with_state(state)
}
