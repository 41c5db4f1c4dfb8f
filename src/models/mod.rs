// Database rows and request/response payloads

pub mod checklist;
pub mod client;
pub mod diet;
pub mod payment;
pub mod trainer;
pub mod validation;
pub mod workout;

pub use checklist::*;
pub use client::*;
pub use diet::*;
pub use payment::*;
pub use trainer::*;
pub use validation::*;
pub use workout::*;
