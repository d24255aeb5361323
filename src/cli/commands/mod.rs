pub mod guard;
pub mod records;
pub mod token;
