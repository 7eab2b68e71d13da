//! Users and their profiles.

mod core;
mod profile;
mod settings_page;

pub use core::{
    User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id,
    normalize_email, set_password,
};
pub use profile::{
    ProfileResponse, ProfileUpdate, get_profile, get_profile_endpoint, update_profile,
    update_profile_endpoint,
};
pub use settings_page::get_settings_page;
