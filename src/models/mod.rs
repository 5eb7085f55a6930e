pub mod availability;
pub mod domain;
pub mod errors;
pub mod report;
pub mod request;
pub mod response;

pub use availability::*;
pub use domain::*;
pub use errors::*;
pub use report::*;
pub use request::*;
pub use response::*;
