//! Cross-target bound compatibility.
//!
//! `reqwest` futures are `Send` on native targets but not on
//! `wasm32-unknown-unknown`. [`ConditionalSync`] resolves to `Send + Sync`
//! natively and to no bound at all on wasm, so the transport and clock
//! traits can be written once.

#[allow(missing_docs)]
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<S> ConditionalSync for S where S: Send + Sync {}

#[allow(missing_docs)]
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSync {}

#[cfg(target_arch = "wasm32")]
impl<S> ConditionalSync for S {}
