pub mod hours;
pub mod run;
