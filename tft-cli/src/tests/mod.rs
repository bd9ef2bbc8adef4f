//! Shared test harness modules for the `tft` CLI.

use super::*;

mod steps;
