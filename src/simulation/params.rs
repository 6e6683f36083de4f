//! Tunable simulation parameters
//!
//! A [`ParamSpec`] is static metadata (name and bounds) declared next to the
//! simulation that owns the value. At draw time the simulation pairs each spec with
//! a mutable reference to its backing field and hands the list to [`draw_params`],
//! which renders one slider per entry. Sliders write straight into the bound field
//! and always clamp, including values typed in with ctrl+click.

use imgui::{SliderFlags, Ui};

use super::error::SimulationError;

/// Kind and bounds of a parameter. Only the active kind carries bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Float { min: f32, max: f32 },
    Int { min: i32, max: i32 },
}

/// Static description of a tunable value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn float(name: &'static str, min: f32, max: f32) -> Self {
        Self {
            name,
            kind: ParamKind::Float { min, max },
        }
    }

    pub const fn int(name: &'static str, min: i32, max: i32) -> Self {
        Self {
            name,
            kind: ParamKind::Int { min, max },
        }
    }

    /// Clamps an integer value into its declared range (identity for float parameters)
    pub fn clamp_int(&self, value: i32) -> i32 {
        match self.kind {
            ParamKind::Int { min, max } => value.clamp(min, max),
            ParamKind::Float { .. } => value,
        }
    }

    /// Clamps a float value into its declared range (identity for int parameters)
    pub fn clamp_float(&self, value: f32) -> f32 {
        match self.kind {
            ParamKind::Float { min, max } => value.clamp(min, max),
            ParamKind::Int { .. } => value,
        }
    }

    /// Checks an integer against the bounds, for values set programmatically
    pub fn validate_int(&self, value: i32) -> Result<i32, SimulationError> {
        if self.clamp_int(value) == value {
            Ok(value)
        } else {
            Err(SimulationError::InvalidParameter {
                name: self.name,
                value: value as f64,
            })
        }
    }
}

/// Mutable reference to the storage behind a parameter
pub enum ParamValue<'a> {
    Float(&'a mut f32),
    Int(&'a mut i32),
}

/// A spec bound to its backing storage for one frame
pub struct Parameter<'a> {
    pub spec: &'static ParamSpec,
    pub value: ParamValue<'a>,
}

impl<'a> Parameter<'a> {
    pub fn float(spec: &'static ParamSpec, value: &'a mut f32) -> Self {
        Self {
            spec,
            value: ParamValue::Float(value),
        }
    }

    pub fn int(spec: &'static ParamSpec, value: &'a mut i32) -> Self {
        Self {
            spec,
            value: ParamValue::Int(value),
        }
    }

    /// Writes the clamped value back; returns true when the stored value changed
    pub fn clamp_in_place(&mut self) -> bool {
        match &mut self.value {
            ParamValue::Float(v) => {
                let clamped = self.spec.clamp_float(**v);
                let changed = clamped != **v;
                **v = clamped;
                changed
            }
            ParamValue::Int(v) => {
                let clamped = self.spec.clamp_int(**v);
                let changed = clamped != **v;
                **v = clamped;
                changed
            }
        }
    }
}

/// Draws one slider per parameter and returns true if any value changed
pub fn draw_params(ui: &Ui, params: &mut [Parameter<'_>]) -> bool {
    let mut changed = false;
    for param in params.iter_mut() {
        match (param.spec.kind, &mut param.value) {
            (ParamKind::Float { min, max }, ParamValue::Float(value)) => {
                changed |= ui
                    .slider_config(param.spec.name, min, max)
                    .flags(SliderFlags::ALWAYS_CLAMP)
                    .build(&mut **value);
            }
            (ParamKind::Int { min, max }, ParamValue::Int(value)) => {
                changed |= ui
                    .slider_config(param.spec.name, min, max)
                    .flags(SliderFlags::ALWAYS_CLAMP)
                    .build(&mut **value);
            }
            _ => {
                ui.text_disabled(format!("{}: kind mismatch", param.spec.name));
                continue;
            }
        }
        changed |= param.clamp_in_place();
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    static GRID: ParamSpec = ParamSpec::int("Grid Size", 16, 128);
    static GRAVITY: ParamSpec = ParamSpec::float("Gravity", 1.0, 20.0);

    #[test]
    fn test_clamping() {
        assert_eq!(GRID.clamp_int(4), 16);
        assert_eq!(GRID.clamp_int(64), 64);
        assert_eq!(GRID.clamp_int(500), 128);
        assert_eq!(GRAVITY.clamp_float(0.0), 1.0);
        assert_eq!(GRAVITY.clamp_float(25.0), 20.0);
        // Clamping against the other kind leaves the value alone
        assert_eq!(GRAVITY.clamp_int(500), 500);
    }

    #[test]
    fn test_validate_int() {
        assert_eq!(GRID.validate_int(32), Ok(32));
        assert!(matches!(
            GRID.validate_int(0),
            Err(SimulationError::InvalidParameter { name: "Grid Size", .. })
        ));
    }

    #[test]
    fn test_parameter_writes_through_binding() {
        let mut size = 300;
        let mut gravity = 9.81;
        {
            let mut params = [
                Parameter::int(&GRID, &mut size),
                Parameter::float(&GRAVITY, &mut gravity),
            ];
            assert!(params[0].clamp_in_place());
            assert!(!params[1].clamp_in_place());
        }
        assert_eq!(size, 128);
        assert_eq!(gravity, 9.81);
    }
}
