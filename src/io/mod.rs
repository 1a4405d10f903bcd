pub mod cost_table;
pub mod fasta;
pub mod report;

pub use cost_table::load_cost_model;
pub use fasta::load_sequences;
