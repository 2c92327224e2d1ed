pub mod enrichment;
