pub mod capabilities;
pub mod driver;
pub mod page;
