pub mod employee;
pub mod event;
pub mod order;
pub mod source;
pub mod tracking;
