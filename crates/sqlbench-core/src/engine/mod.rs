pub mod orchestrator;
pub mod pool;
pub mod runner;
