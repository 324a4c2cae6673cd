pub mod demo;
pub mod tail;
