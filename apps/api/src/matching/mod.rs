// Compatibility scoring — requirement mining from job text plus pure scoring.
// Nothing here fails on data quality: malformed requirements degrade to `none`
// and scoring panics become zeroed results.

pub mod corpus;
pub mod handlers;
pub mod requirements;
pub mod scoring;
