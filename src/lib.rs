#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
pub mod config;
pub mod filter;
pub mod io;
pub mod join;
pub mod normalize;
pub mod pipeline;
pub mod project;
pub mod sort;
pub mod types;
