use serde::{Deserialize, Serialize};

use crate::store::UserRecord;

/// Response for /profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
}

/// Full dump returned by /users, in the on-disk record layout (hashed
/// passwords included).
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserRecord>,
}

/// Request body for the password update.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
