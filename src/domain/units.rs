//! Astronomical distance constants shared by the compactor and the
//! normalized close-approach endpoint.

/// Kilometres per astronomical unit.
pub const AU_KM: f64 = 149_597_870.7;

/// Astronomical units per lunar distance, as the tool grammar defines the
/// "<N>LD" shorthand. Dividing an AU distance by this yields LD.
pub const LD_AU: f64 = 0.002569;

/// Mean Earth-Moon distance in kilometres.
pub const LD_KM: f64 = 384_400.0;

/// Lunar distances per astronomical unit (~389.172), derived from the
/// kilometre constants. The normalized endpoint multiplies by this.
pub const AU_TO_LD: f64 = AU_KM / LD_KM;
