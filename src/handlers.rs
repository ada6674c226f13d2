pub mod auth;
pub mod users;
pub mod artists;
pub mod clubs;
pub mod events;
pub mod invitations;
pub mod collaboration;
pub mod pos;
pub mod reports;
pub mod dashboard;
