/// Tolerance for floating-point comparisons (matrix symmetry, flat curves).
pub const EPSILON: f64 = 1e-9;

/// Default influence coefficient of one diffusion step.
pub const DEFAULT_DIFFUSION_ALPHA: f64 = 0.1;

/// Default number of diffusion steps per simulated trajectory.
pub const DEFAULT_HORIZON: usize = 10;

/// Default cascade activation threshold.
pub const DEFAULT_CASCADE_THRESHOLD: f64 = 0.5;

/// Default Monte Carlo trial count.
pub const DEFAULT_NUM_SIMULATIONS: usize = 1000;

/// Default tipping-point sweep resolution.
pub const DEFAULT_GRID_POINTS: usize = 100;
