pub mod auth;
pub mod user_service;
pub mod artist_service;
pub mod club_service;
pub mod event_service;
pub mod invitation_service;
pub mod collaboration_service;
pub mod pos_service;
pub mod receipt_service;
pub mod report_service;
pub mod dashboard_service;
