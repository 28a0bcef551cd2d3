mod general;
mod request;

pub use general::{CLASS as GENERAL_CLASS, GeneralInformation};
pub use request::{CLASS as REQUEST_CLASS, RequestInformation};
