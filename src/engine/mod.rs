pub mod compare;
pub mod extract;
pub mod hours;
pub mod jsonpath;
pub mod rules;
pub mod transform;
