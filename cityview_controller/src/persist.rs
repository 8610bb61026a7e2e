// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// The part of the view state that survives a process restart.
///
/// The tile size is deliberately absent: a restored view starts at whatever
/// tile size the controller currently uses.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewState {
    /// Scale factor.
    pub scale: f64,
    /// Origin x, in map pixels.
    pub origin_x: f64,
    /// Origin y, in map pixels.
    pub origin_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}
