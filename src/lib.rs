// Builds the county-level results document of a state from its election
// extracts, and checks the competitiveness ratings of such a document.

pub mod args;
pub mod pipeline;
