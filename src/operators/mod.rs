//! Neighborhood operator toolkit.
//!
//! # Single-route operators
//!
//! - [`swap`]: exchange two positions
//! - [`insert`]: move one stop, shifting the span between (rotation)
//! - [`reverse`]: reverse a span (2-opt move)
//! - [`Operator::apply_random`]: uniform pick of the three
//!
//! # Multi-route moves
//!
//! - [`pd_shift`], [`pd_exchange`], [`pd_rearrange`] and swap-sequence,
//!   dispatched through [`MultiRouteMove`]
//!
//! # Repair
//!
//! - [`clamp_indices`]: bound-repair after numeric position updates
//! - [`repair_permutation`]: restore a permutation after rounding
//!
//! # References
//!
//! - Nanry & Barnes (2000), "Solving the pickup and delivery problem with
//!   time windows using reactive tabu search" (PD-shift / PD-exchange /
//!   PD-rearrange neighborhoods)
//! - Croes (1958), "A Method for Solving Traveling-Salesman Problems" (2-opt)

mod inter;
mod intra;

pub use inter::{pd_exchange, pd_rearrange, pd_shift, MoveUndo, MultiRouteMove};
pub use intra::{
    clamp_indices, insert, random_insert, random_reverse, random_swap, repair_permutation,
    reverse, swap, swap_sequence, Operator,
};
pub(crate) use intra::distinct_pair;
