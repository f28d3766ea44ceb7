pub mod enrichment; // Door completion → compliance validation
