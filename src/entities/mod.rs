pub mod driver_profile;
pub mod marshal_profile;
pub mod message;
pub mod owner_profile;
pub mod rental_offer;
pub mod roadside_assistance_request;
pub mod route;
pub mod service_provider_profile;
pub mod staff_profile;
pub mod taxi_rank;
pub mod taxi_rank_association;
pub mod taxi_rank_trip;
pub mod tenant;
pub mod tender;
pub mod tender_application;
pub mod tracking_device_offer;
pub mod tracking_device_request;
pub mod trip_passenger;
pub mod trip_schedule;
pub mod user;
pub mod vehicle;
pub mod vehicle_document;
pub mod vehicle_earning;
pub mod vehicle_expense;
pub mod vehicle_rental_booking;
pub mod vehicle_rental_request;
pub mod vehicle_route_assignment;
pub mod vehicle_taxi_rank;
