pub mod artists;
pub mod auth;
pub mod clubs;
pub mod collaboration;
pub mod dashboard;
pub mod events;
pub mod invitations;
pub mod pos;
pub mod reports;
