pub mod d001_community;

pub use d001_community::ui::CommunityDashboard;
