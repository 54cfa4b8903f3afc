pub mod notifications;
pub mod social;
pub mod welcome;
