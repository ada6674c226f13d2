pub mod user_repo;
pub use user_repo::UserRepository;
pub mod artist_repo;
pub use artist_repo::ArtistRepository;
pub mod club_repo;
pub use club_repo::ClubRepository;
pub mod event_repo;
pub use event_repo::EventRepository;
pub mod invitation_repo;
pub use invitation_repo::InvitationRepository;
pub mod collaboration_repo;
pub use collaboration_repo::CollaborationRepository;
pub mod pos_repo;
pub use pos_repo::PosRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
