pub mod orchestrator;
pub mod transform;
