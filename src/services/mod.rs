pub mod clock;
pub mod dedup;
pub mod id_generator;
pub mod lock_manager;
pub mod payment_service;
pub mod simulator;
