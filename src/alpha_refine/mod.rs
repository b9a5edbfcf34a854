pub mod classify;
pub mod components;
pub mod config;
pub mod edge_refine;
pub mod pipeline;
pub mod solidify;
pub mod statistics;
