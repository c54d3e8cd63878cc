mod dashboard;

pub use dashboard::CommunityDashboard;
