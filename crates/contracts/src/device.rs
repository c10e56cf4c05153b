//! SensingDevice trait - lifecycle controls of the frame source
//!
//! Pass-through commands only: nothing here touches tracking session state.

use crate::ContractError;

/// Mechanical tilt limit of the sensor head (degrees, symmetric)
pub const MAX_ELEVATION_DEGREES: i32 = 27;

/// Step applied by `tilt_up` / `tilt_down` style commands
pub const TILT_STEP_DEGREES: i32 = 5;

/// Clamp a requested elevation change to the mechanical range
///
/// # Example
/// ```
/// use contracts::clamp_elevation;
///
/// assert_eq!(clamp_elevation(25, 5), 27);
/// assert_eq!(clamp_elevation(-10, -5), -15);
/// ```
#[inline]
pub fn clamp_elevation(current: i32, delta: i32) -> i32 {
    current
        .saturating_add(delta)
        .clamp(-MAX_ELEVATION_DEGREES, MAX_ELEVATION_DEGREES)
}

/// Frame-producing sensing device
#[trait_variant::make(SensingDevice: Send)]
pub trait LocalSensingDevice {
    /// Device name (used for logging)
    fn name(&self) -> &str;

    /// Start streaming frames
    ///
    /// # Errors
    /// `DeviceUnavailable` when no connected device exists
    async fn start(&mut self) -> Result<(), ContractError>;

    /// Stop streaming; idempotent
    async fn stop(&mut self) -> Result<(), ContractError>;

    /// Whether frames are currently being produced
    fn is_streaming(&self) -> bool;

    /// Current elevation angle (degrees)
    fn elevation(&self) -> i32;

    /// Tilt by `delta` degrees, clamped to ±`MAX_ELEVATION_DEGREES`
    ///
    /// Returns the resulting elevation.
    async fn tilt(&mut self, delta: i32) -> Result<i32, ContractError>;
}
