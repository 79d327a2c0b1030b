// Utility modules
pub mod parallel;

pub use parallel::ParallelProcessor;
