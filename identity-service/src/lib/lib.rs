pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod seeder;

pub use domain::user;
pub use outbound::repositories;
