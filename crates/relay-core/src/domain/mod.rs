//! Domain entities for the realtime relay.
//!
//! This module contains pure types with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Has **no** imports from network libraries or async runtimes.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Code in outer layers (the server's application and infrastructure layers)
//! depends on the domain, but the domain never depends on them.

/// Connection identity.
///
/// See [`identity::ConnectionId`] for the main type.
pub mod identity;
