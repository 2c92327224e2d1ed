mod common;

mod aggregation;
mod service;
