// Business logic services

pub mod checklist_service;
pub mod client_service;
pub mod diet_service;
pub mod payment_gateway;
pub mod payment_service;
pub mod progress;
pub mod trainer_service;
pub mod workout_service;

pub use checklist_service::ChecklistService;
pub use client_service::ClientService;
pub use diet_service::DietService;
pub use payment_gateway::{PaymentGateway, RazorpayGateway};
pub use payment_service::PaymentService;
pub use trainer_service::TrainerService;
pub use workout_service::WorkoutService;
