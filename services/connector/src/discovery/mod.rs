pub mod extract;
pub mod registry;
pub mod worker;
