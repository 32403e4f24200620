pub mod builder;
pub mod forces;
pub mod setup;
