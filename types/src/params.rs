//! Simulation parameters edited from the Command Center sidebar.
//!
//! Ranges and defaults match the interactive controls: every numeric field
//! has a closed range and a step, and `adjust` never leaves the range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The binary scenario always has two stars and one test planet.
pub const BINARY_BODY_COUNT: usize = 3;

const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
    step: f64,
}

impl Range {
    const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Move one step and snap to the step grid so repeated presses don't drift.
    fn step(self, value: f64, direction: Direction) -> f64 {
        let delta = match direction {
            Direction::Increase => self.step,
            Direction::Decrease => -self.step,
        };
        let steps = ((value + delta - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }
}

const BODY_COUNT_MIN: usize = 2;
const BODY_COUNT_MAX: usize = 60;
const TIME_SPAN: Range = Range::new(1.0, 50.0, 0.5);
const SOFTENING: Range = Range::new(0.01, 0.5, 0.01);
const MASS_MEAN: Range = Range::new(0.1, 10.0, 0.1);
const DISK_RADIUS: Range = Range::new(1.0, 10.0, 0.5);
const VORTEX_STRENGTH: Range = Range::new(0.0, 2.5, 0.1);

/// Which initial configuration to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Disk of stars on tangential orbits, optionally around a central black hole.
    #[default]
    Vortex,
    /// Alpha Centauri A/B with a light test planet.
    BinaryPlanet,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Vortex, Scenario::BinaryPlanet];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Vortex => "vortex",
            Scenario::BinaryPlanet => "binary_planet",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Scenario::Vortex => "Vortex galaxy",
            Scenario::BinaryPlanet => "Binary + planet",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Scenario::Vortex => Scenario::BinaryPlanet,
            Scenario::BinaryPlanet => Scenario::Vortex,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown scenario '{0}' (expected 'vortex' or 'binary')")]
pub struct UnknownScenario(String);

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vortex" | "galaxy" => Ok(Scenario::Vortex),
            "binary" | "binary_planet" | "binary-planet" => Ok(Scenario::BinaryPlanet),
            other => Err(UnknownScenario(other.to_string())),
        }
    }
}

/// Gravitational constant choices offered by the strength selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum GravityPreset {
    Weak,
    #[default]
    Newtonian,
    Strong,
    Extreme,
}

impl GravityPreset {
    pub const ALL: [GravityPreset; 4] = [
        GravityPreset::Weak,
        GravityPreset::Newtonian,
        GravityPreset::Strong,
        GravityPreset::Extreme,
    ];

    /// G in SI units (m³ kg⁻¹ s⁻²).
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            GravityPreset::Weak => 1e-11,
            GravityPreset::Newtonian => 6.67e-11,
            GravityPreset::Strong => 1e-10,
            GravityPreset::Extreme => 5e-10,
        }
    }

    /// Match a raw G value to a preset (relative tolerance 1e-6).
    #[must_use]
    pub fn from_value(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| ((preset.value() - value) / preset.value()).abs() < 1e-6)
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1).min(Self::ALL.len() - 1)]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|p| *p == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for GravityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2e}", self.value())
    }
}

impl From<GravityPreset> for f64 {
    fn from(preset: GravityPreset) -> Self {
        preset.value()
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("gravitational constant {0:e} is not one of the presets (1e-11, 6.67e-11, 1e-10, 5e-10)")]
pub struct UnknownGravity(pub f64);

impl TryFrom<f64> for GravityPreset {
    type Error = UnknownGravity;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(UnknownGravity(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

/// Editable parameters, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamField {
    #[default]
    Scenario,
    BodyCount,
    TimeSpan,
    Gravity,
    Softening,
    MassMean,
    DiskRadius,
    VortexStrength,
    CentralBlackHole,
}

impl ParamField {
    pub const ALL: [ParamField; 9] = [
        ParamField::Scenario,
        ParamField::BodyCount,
        ParamField::TimeSpan,
        ParamField::Gravity,
        ParamField::Softening,
        ParamField::MassMean,
        ParamField::DiskRadius,
        ParamField::VortexStrength,
        ParamField::CentralBlackHole,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ParamField::Scenario => "Scenario",
            ParamField::BodyCount => "Number of Stars (N)",
            ParamField::TimeSpan => "Time Span",
            ParamField::Gravity => "Gravitational Strength",
            ParamField::Softening => "Softening Factor",
            ParamField::MassMean => "Average Star Mass",
            ParamField::DiskRadius => "Initial Disk Radius",
            ParamField::VortexStrength => "Orbital Velocity Factor",
            ParamField::CentralBlackHole => "Central Black Hole",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Whether the field influences generation for `scenario`.
    #[must_use]
    pub fn applies_to(self, scenario: Scenario) -> bool {
        match scenario {
            Scenario::Vortex => true,
            Scenario::BinaryPlanet => matches!(
                self,
                ParamField::Scenario
                    | ParamField::TimeSpan
                    | ParamField::Gravity
                    | ParamField::Softening
            ),
        }
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|f| *f == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParamError {
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: ParamField,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: ParamField },
}

/// Full parameter set for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub scenario: Scenario,
    pub body_count: usize,
    pub time_span: f64,
    pub gravity: GravityPreset,
    pub softening: f64,
    pub mass_mean: f64,
    pub disk_radius: f64,
    pub vortex_strength: f64,
    pub central_black_hole: bool,
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            scenario: Scenario::Vortex,
            body_count: 20,
            time_span: 15.0,
            gravity: GravityPreset::Newtonian,
            softening: 0.15,
            mass_mean: 1.0,
            disk_radius: 5.0,
            vortex_strength: 1.2,
            central_black_hole: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationParams {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of bodies the scenario will actually generate.
    #[must_use]
    pub fn effective_body_count(&self) -> usize {
        match self.scenario {
            Scenario::Vortex => self.body_count,
            Scenario::BinaryPlanet => BINARY_BODY_COUNT,
        }
    }

    /// Move `field` one step in `direction`, clamped to its range.
    pub fn adjust(&mut self, field: ParamField, direction: Direction) {
        match field {
            ParamField::Scenario => self.scenario = self.scenario.next(),
            ParamField::BodyCount => {
                self.body_count = match direction {
                    Direction::Increase => (self.body_count + 1).min(BODY_COUNT_MAX),
                    Direction::Decrease => self.body_count.saturating_sub(1).max(BODY_COUNT_MIN),
                };
            }
            ParamField::TimeSpan => self.time_span = TIME_SPAN.step(self.time_span, direction),
            ParamField::Gravity => {
                self.gravity = match direction {
                    Direction::Increase => self.gravity.next(),
                    Direction::Decrease => self.gravity.prev(),
                };
            }
            ParamField::Softening => self.softening = SOFTENING.step(self.softening, direction),
            ParamField::MassMean => self.mass_mean = MASS_MEAN.step(self.mass_mean, direction),
            ParamField::DiskRadius => {
                self.disk_radius = DISK_RADIUS.step(self.disk_radius, direction);
            }
            ParamField::VortexStrength => {
                self.vortex_strength = VORTEX_STRENGTH.step(self.vortex_strength, direction);
            }
            ParamField::CentralBlackHole => self.central_black_hole = !self.central_black_hole,
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if !(BODY_COUNT_MIN..=BODY_COUNT_MAX).contains(&self.body_count) {
            return Err(ParamError::OutOfRange {
                field: ParamField::BodyCount,
                value: self.body_count as f64,
                min: BODY_COUNT_MIN as f64,
                max: BODY_COUNT_MAX as f64,
            });
        }
        for (field, range, value) in self.ranged_fields() {
            if !value.is_finite() {
                return Err(ParamError::NotFinite { field });
            }
            if !range.contains(value) {
                return Err(ParamError::OutOfRange {
                    field,
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }

    /// Pull every field back into range. Non-finite values reset to the default.
    /// Returns the fields that changed.
    pub fn clamp_to_ranges(&mut self) -> Vec<ParamField> {
        let defaults = Self::default();
        let mut changed = Vec::new();

        let count = self.body_count.clamp(BODY_COUNT_MIN, BODY_COUNT_MAX);
        if count != self.body_count {
            self.body_count = count;
            changed.push(ParamField::BodyCount);
        }

        let mut fix = |field: ParamField, range: Range, value: &mut f64, default: f64| {
            let fixed = if value.is_finite() {
                range.clamp(*value)
            } else {
                default
            };
            if fixed.to_bits() != value.to_bits() {
                *value = fixed;
                changed.push(field);
            }
        };
        fix(
            ParamField::TimeSpan,
            TIME_SPAN,
            &mut self.time_span,
            defaults.time_span,
        );
        fix(
            ParamField::Softening,
            SOFTENING,
            &mut self.softening,
            defaults.softening,
        );
        fix(
            ParamField::MassMean,
            MASS_MEAN,
            &mut self.mass_mean,
            defaults.mass_mean,
        );
        fix(
            ParamField::DiskRadius,
            DISK_RADIUS,
            &mut self.disk_radius,
            defaults.disk_radius,
        );
        fix(
            ParamField::VortexStrength,
            VORTEX_STRENGTH,
            &mut self.vortex_strength,
            defaults.vortex_strength,
        );
        changed
    }

    /// Sidebar rendering of a field's current value.
    #[must_use]
    pub fn display_value(&self, field: ParamField) -> String {
        match field {
            ParamField::Scenario => self.scenario.label().to_string(),
            ParamField::BodyCount => self.effective_body_count().to_string(),
            ParamField::TimeSpan => format!("{:.1}", self.time_span),
            ParamField::Gravity => self.gravity.to_string(),
            ParamField::Softening => format!("{:.2}", self.softening),
            ParamField::MassMean => format!("{:.1} M☉", self.mass_mean),
            ParamField::DiskRadius => format!("{:.1}", self.disk_radius),
            ParamField::VortexStrength => format!("{:.1}", self.vortex_strength),
            ParamField::CentralBlackHole => {
                if self.central_black_hole { "on" } else { "off" }.to_string()
            }
        }
    }

    fn ranged_fields(&self) -> [(ParamField, Range, f64); 5] {
        [
            (ParamField::TimeSpan, TIME_SPAN, self.time_span),
            (ParamField::Softening, SOFTENING, self.softening),
            (ParamField::MassMean, MASS_MEAN, self.mass_mean),
            (ParamField::DiskRadius, DISK_RADIUS, self.disk_radius),
            (ParamField::VortexStrength, VORTEX_STRENGTH, self.vortex_strength),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Direction, GravityPreset, ParamError, ParamField, Scenario, SimulationParams,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn defaults_are_valid() {
        let params = SimulationParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.body_count, 20);
        assert_eq!(params.gravity.value(), 6.67e-11);
        assert!(params.central_black_hole);
    }

    #[test]
    fn body_count_clamps_at_both_ends() {
        let mut params = SimulationParams {
            body_count: 60,
            ..SimulationParams::default()
        };
        params.adjust(ParamField::BodyCount, Direction::Increase);
        assert_eq!(params.body_count, 60);

        params.body_count = 2;
        params.adjust(ParamField::BodyCount, Direction::Decrease);
        assert_eq!(params.body_count, 2);
    }

    #[test]
    fn float_steps_stay_on_grid() {
        let mut params = SimulationParams::default();
        for _ in 0..7 {
            params.adjust(ParamField::Softening, Direction::Increase);
        }
        assert!(approx(params.softening, 0.22), "got {}", params.softening);

        for _ in 0..200 {
            params.adjust(ParamField::Softening, Direction::Decrease);
        }
        assert!(approx(params.softening, 0.01));

        for _ in 0..200 {
            params.adjust(ParamField::TimeSpan, Direction::Increase);
        }
        assert!(approx(params.time_span, 50.0));
    }

    #[test]
    fn gravity_steps_through_presets_without_wrapping() {
        let mut params = SimulationParams::default();
        params.adjust(ParamField::Gravity, Direction::Increase);
        assert_eq!(params.gravity, GravityPreset::Strong);
        params.adjust(ParamField::Gravity, Direction::Increase);
        params.adjust(ParamField::Gravity, Direction::Increase);
        assert_eq!(params.gravity, GravityPreset::Extreme);

        for _ in 0..5 {
            params.adjust(ParamField::Gravity, Direction::Decrease);
        }
        assert_eq!(params.gravity, GravityPreset::Weak);
    }

    #[test]
    fn toggles_ignore_direction() {
        let mut params = SimulationParams::default();
        params.adjust(ParamField::CentralBlackHole, Direction::Decrease);
        assert!(!params.central_black_hole);
        params.adjust(ParamField::Scenario, Direction::Decrease);
        assert_eq!(params.scenario, Scenario::BinaryPlanet);
        assert_eq!(params.effective_body_count(), 3);
    }

    #[test]
    fn validate_names_the_offending_field() {
        let params = SimulationParams {
            disk_radius: 0.5,
            ..SimulationParams::default()
        };
        match params.validate() {
            Err(ParamError::OutOfRange { field, .. }) => {
                assert_eq!(field, ParamField::DiskRadius);
            }
            other => panic!("expected out of range, got {other:?}"),
        }

        let params = SimulationParams {
            softening: f64::NAN,
            ..SimulationParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamError::NotFinite {
                field: ParamField::Softening
            })
        );
    }

    #[test]
    fn clamp_reports_changed_fields() {
        let mut params = SimulationParams {
            body_count: 500,
            time_span: f64::INFINITY,
            vortex_strength: -1.0,
            ..SimulationParams::default()
        };
        let changed = params.clamp_to_ranges();
        assert_eq!(
            changed,
            vec![
                ParamField::BodyCount,
                ParamField::TimeSpan,
                ParamField::VortexStrength
            ]
        );
        assert_eq!(params.body_count, 60);
        assert_eq!(params.time_span, 15.0);
        assert_eq!(params.vortex_strength, 0.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn field_navigation_wraps() {
        assert_eq!(ParamField::Scenario.prev(), ParamField::CentralBlackHole);
        assert_eq!(ParamField::CentralBlackHole.next(), ParamField::Scenario);
        assert!(!ParamField::DiskRadius.applies_to(Scenario::BinaryPlanet));
        assert!(ParamField::Softening.applies_to(Scenario::BinaryPlanet));
    }

    #[test]
    fn scenario_and_gravity_parse() {
        assert_eq!("binary".parse::<Scenario>().unwrap(), Scenario::BinaryPlanet);
        assert_eq!(" Vortex ".parse::<Scenario>().unwrap(), Scenario::Vortex);
        assert!("spiral".parse::<Scenario>().is_err());
        assert_eq!(GravityPreset::from_value(1e-10), Some(GravityPreset::Strong));
        assert_eq!(GravityPreset::from_value(2e-10), None);
    }

    #[test]
    fn params_round_trip_through_json() {
        let params = SimulationParams::default().with_seed(7);
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json["gravity"], serde_json::json!(6.67e-11));
        assert_eq!(json["scenario"], serde_json::json!("vortex"));
        let back: SimulationParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }
}
