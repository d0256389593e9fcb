pub mod catalog;
pub mod cities;
pub mod groups;
pub mod preferences;
pub mod recommendations;
pub mod similarity;
pub mod users;
