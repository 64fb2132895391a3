pub mod address;
pub mod error;
pub mod hours;
pub mod mapping;
pub mod report;
pub mod value_path;
