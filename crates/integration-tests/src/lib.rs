//! Integration tests for Okazje+.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p okazje-integration-tests
//!
//! # With the vote transaction tests
//! DATABASE_URL=postgres://localhost/okazje_test cargo test -p okazje-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `aliexpress_signing` - AOP request signing against fixed vectors
//! - `deal_voting` - The storefront vote transaction against `PostgreSQL`
//! - `import_pipeline` - Import runs against in-memory feed, enricher and store
//!
//! `deal_voting` needs `DATABASE_URL` and returns early without it. The rest
//! need no database or network access.
