pub mod alphabet;
pub mod common;
pub mod error;
pub mod fasta;
pub mod hmm;
pub mod mocks;
pub mod prob;
pub mod report;
pub mod topology;

extern crate jemallocator;
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[macro_use]
extern crate approx;
