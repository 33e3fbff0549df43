pub mod assistant_service;
pub mod booking_service;
pub mod matching;
pub mod profile_service;
pub mod request_service;
pub mod ride_service;
pub mod trip_service;
