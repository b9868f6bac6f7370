pub mod booking;
pub mod builder;
pub mod generator;
pub mod matcher;
pub mod slots;
