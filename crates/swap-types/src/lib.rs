//! Shared types for the intent swap pipeline.
//!
//! Every crate in the workspace speaks in terms of these types: the intent a
//! maker authorizes, the signed form submitted to the relayer, the normalized
//! order records produced from relayer feeds, and the events broadcast while a
//! swap is in flight.

pub mod account;
pub mod delivery;
pub mod events;
pub mod intent;
pub mod order;
pub mod quote;
pub mod settlement;
pub mod token;
pub mod validation;

pub use account::*;
pub use delivery::*;
pub use events::*;
pub use intent::*;
pub use order::*;
pub use quote::*;
pub use settlement::*;
pub use token::*;
pub use validation::*;
