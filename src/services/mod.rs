pub mod covers;
pub mod providers;
pub mod recommendations;

pub use covers::CoverValidator;
pub use recommendations::Recommender;
