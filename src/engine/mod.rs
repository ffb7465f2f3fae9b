pub mod checkout;
pub mod dates;
pub mod filler;
pub mod import;
pub mod seed;
pub mod status;
pub mod tracking;
pub mod tracking_id;
