// Handler modules
pub mod sum;
pub mod total;

// Re-export all handler functions
pub use sum::{handle_sum, sum_quantities};
pub use total::{TotalOptions, compute_total, handle_total};
