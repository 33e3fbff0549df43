pub mod assistant;
pub mod auth;
pub mod home;
pub mod profile;
pub mod requests;
pub mod rides;
pub mod trips;

use crate::services::profile_service::SessionUser;
use crate::web::middleware::auth::AuthenticatedUser;

pub(crate) fn session_user(auth: &AuthenticatedUser) -> SessionUser<'_> {
    SessionUser {
        user_id: &auth.id,
        email: auth.email.as_deref(),
        display_name: auth.name.as_deref(),
    }
}

// Fuel shares are whole rupees almost everywhere; only show paise when
// a settlement actually produced them.
pub(crate) fn rupees(amount: f64) -> String {
    if amount.fract().abs() < f64::EPSILON {
        format!("₹{:.0}", amount)
    } else {
        format!("₹{:.2}", amount)
    }
}

// Redirect-notice codes rendered as banners. Unknown codes render nothing.
pub(crate) fn notice_message(code: &str) -> String {
    match code {
        "booked" => "Seat booked! Find it under My Trips.",
        "ride_unavailable" => "That ride is no longer available - the seat may have been taken.",
        "insufficient_balance" => "Insufficient wallet balance for this ride.",
        "booking_failed" => "Booking failed. Please try again.",
        "ride_created" => "Your ride is live. Riders nearby can now book a seat.",
        "ride_create_failed" => "Could not publish the ride. Please try again.",
        "request_posted" => "Request broadcast to drivers nearby.",
        "request_failed" => "Could not post the request. Please try again.",
        "request_accepted" => "Request accepted. The rider has been added to your trips.",
        "request_unavailable" => "That request was already taken.",
        "profile_saved" => "Profile saved.",
        "profile_save_failed" => "Could not save your profile. Please try again.",
        "feedback_thanks" => "Thanks for the feedback!",
        _ => "",
    }
    .to_string()
}
