pub mod auth;
pub mod newsletter;
pub mod subscribers;
pub mod tags;
pub mod track;
