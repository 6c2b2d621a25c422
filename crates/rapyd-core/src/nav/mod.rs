//! Navigation logic.
//!
//! [`controller::NavigationController`] tracks the current directory and
//! applies listing results with last-request-wins semantics;
//! [`filter`] derives the displayed order from a listing and a query.

pub mod controller;
pub mod filter;

pub use controller::{
    parent_path, Activation, ListingRequest, ListingResponse, NavigationController,
    NavigationState,
};
