//! API Tests
//!
//! - part_01: health, metrics and test listing endpoints
//! - part_02: statistical test endpoints, success and error envelopes

mod part_01;
