// API routes and handlers

pub mod auth;
pub mod checklist;
pub mod clients;
pub mod diets;
pub mod health;
pub mod payments;
pub mod routes;
pub mod trainers;
pub mod workouts;
