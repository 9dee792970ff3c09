// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Reserved local-variable slot indices (spec §3).
//!
//! Each neuron carries a fixed-size array of 256 `f32` local variables.
//! The first handful of slots carry reserved semantic meaning; the rest are
//! free for gene code to use, subject to the `USER_LVAR_WRITABLE_LIMIT`
//! boundary (see `hidra-config`).

/// Total number of local variable slots per neuron.
pub const LVAR_COUNT: usize = 256;

/// Total number of global hormone slots.
pub const GVAR_COUNT: usize = 256;

pub const LVAR_SOMA_POTENTIAL: usize = 0;
pub const LVAR_DENDRITIC_POTENTIAL: usize = 1;
pub const LVAR_HEALTH: usize = 2;
pub const LVAR_AGE: usize = 3;
pub const LVAR_REFRACTORY_TIME_LEFT: usize = 4;
pub const LVAR_REFRACTORY_PERIOD: usize = 5;
pub const LVAR_THRESHOLD_ADAPTATION_FACTOR: usize = 6;
pub const LVAR_THRESHOLD_RECOVERY_RATE: usize = 7;
pub const LVAR_FIRING_RATE: usize = 8;
pub const LVAR_ADAPTIVE_THRESHOLD: usize = 9;
/// The neuron's total potential (`dendritic + soma`) at the instant it last
/// crossed the firing threshold, captured before `SomaPotential` is reset to
/// `0`. Delayed/Transient/Persistent synapse amplitudes are computed from
/// this value on the subsequent `Activate`, not from `SomaPotential` at
/// Activate time (which has already been reset and decayed by then).
pub const LVAR_LAST_FIRING_POTENTIAL: usize = 10;

/// Number of reserved slots; indices `0..RESERVED_LVAR_COUNT` carry the
/// semantics above.
pub const RESERVED_LVAR_COUNT: usize = 11;
