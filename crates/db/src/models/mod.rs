pub mod campaign;
pub mod recipient;
pub mod subscriber;
pub mod tag;
pub mod user;
