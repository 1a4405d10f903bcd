extern crate num;

pub mod errors;
pub mod io;
pub mod sequences;
pub mod aligner;
