// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the Cityview demos: logger setup and a small sample
//! city to drive the controller with.

mod city;
mod logging;

pub use city::{Bulldozer, DIRT, RESIDENTIAL, RIVER, SampleCity};
pub use logging::{LoggingConfig, init_logging};
