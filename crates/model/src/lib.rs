pub mod availability;
pub mod class;
pub mod day;
pub mod errors;
pub mod rooms;
pub mod session;
pub mod window;
