//! Domain constants shared across the workspace.

/// System base power in MVA, used when rendering per-unit data.
pub const BASE_POWER_MVA: f64 = 100.0;

/// Value the format uses for "no limit" (e.g. blank reactive limits).
pub const INFINITY_LIMIT: f64 = 99_999.0;

/// Default upper voltage limit in pu.
pub const DEFAULT_VMAX: f64 = 1.100;

/// Default lower voltage limit in pu.
pub const DEFAULT_VMIN: f64 = 0.950;
