//! Scope description: viewport geometry and the fixed channel set.
//!
//! Loaded from JSON by the host page, e.g.
//!
//! ```json
//! {
//!   "width": 800, "height": 160, "margin": 8,
//!   "channels": [
//!     { "kind": "generator", "frequency": 1000, "amplitude": 33.3, "phaseDegrees": 0 },
//!     { "kind": "composite", "siblings": [0], "policy": "sum", "capture": true }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::dsp::harmonic::DEFAULT_HARMONIC_COUNT;
use crate::dsp::mixer::CompositionPolicy;
use crate::dsp::oscillator::SineParams;
use crate::dsp::stroke::Viewport;
use crate::error::ConfigError;

// ── Scope Configuration (top-level) ─────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopeConfig {
    /// Horizontal resolution in pixels (samples per trace).
    pub width: usize,
    /// Vertical extent of each channel in pixels.
    pub height: f64,
    /// Vertical padding outside the plotting band.
    pub margin: f64,
    /// Harmonics analysed per stroke.
    pub harmonic_count: usize,
    /// Channels in tick order.
    pub channels: Vec<ChannelSpec>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        ScopeConfig {
            width: 800,
            height: 160.0,
            margin: 8.0,
            harmonic_count: DEFAULT_HARMONIC_COUNT,
            channels: vec![
                ChannelSpec::generator(SineParams::new(1000.0, 33.3, 0.0)),
                ChannelSpec::generator(SineParams::new(2000.0, 33.3, 90.0)),
                ChannelSpec::generator(SineParams::new(3183.1, 33.3, 180.0)),
                ChannelSpec::Composite {
                    siblings: vec![0, 1, 2],
                    policy: CompositionPolicy::Mean,
                    capture: true,
                    harmonics: true,
                },
            ],
        }
    }
}

// ── Channel Specs ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChannelSpec {
    Generator {
        frequency: f64,
        amplitude: f64,
        #[serde(rename = "phaseDegrees")]
        phase_degrees: f64,
        /// Phase degrees added after every tick.
        #[serde(default)]
        drift: f64,
    },
    Composite {
        siblings: Vec<usize>,
        #[serde(default)]
        policy: CompositionPolicy,
        /// Accept freehand strokes.
        #[serde(default)]
        capture: bool,
        /// Fit sibling generators to each stroke.
        #[serde(default)]
        harmonics: bool,
    },
}

impl ChannelSpec {
    pub fn generator(params: SineParams) -> Self {
        ChannelSpec::Generator {
            frequency: params.frequency,
            amplitude: params.amplitude,
            phase_degrees: params.phase_degrees,
            drift: 0.0,
        }
    }

    /// Initial generator configuration, `None` for composites.
    pub fn params(&self) -> Option<SineParams> {
        match *self {
            ChannelSpec::Generator {
                frequency,
                amplitude,
                phase_degrees,
                ..
            } => Some(SineParams::new(frequency, amplitude, phase_degrees)),
            ChannelSpec::Composite { .. } => None,
        }
    }

    pub fn is_generator(&self) -> bool {
        matches!(self, ChannelSpec::Generator { .. })
    }
}

impl ScopeConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScopeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.height, self.margin)
    }

    /// Reject descriptions that would break the channel invariants:
    /// composites may only read existing generator channels, and an
    /// analysing composite needs a harmonic component for every sibling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.height.is_finite() && self.margin.is_finite())
            || self.height - 2.0 * self.margin <= 0.0
        {
            return Err(ConfigError::EmptyViewport {
                height: self.height,
                margin: self.margin,
            });
        }
        for (channel, spec) in self.channels.iter().enumerate() {
            match spec {
                ChannelSpec::Generator {
                    frequency,
                    amplitude,
                    phase_degrees,
                    drift,
                } => {
                    let fields = [
                        ("frequency", *frequency),
                        ("amplitude", *amplitude),
                        ("phaseDegrees", *phase_degrees),
                        ("drift", *drift),
                    ];
                    if let Some(&(field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                        return Err(ConfigError::NonFinite {
                            channel,
                            field,
                            value,
                        });
                    }
                }
                ChannelSpec::Composite {
                    siblings, harmonics, ..
                } => {
                    let candidates = 2 * self.harmonic_count;
                    if *harmonics && siblings.len() > candidates {
                        return Err(ConfigError::TooFewHarmonics {
                            channel,
                            siblings: siblings.len(),
                            candidates,
                        });
                    }
                    for &sibling in siblings {
                        match self.channels.get(sibling) {
                            None => return Err(ConfigError::MissingSibling { channel, sibling }),
                            Some(s) if !s.is_generator() => {
                                return Err(ConfigError::SiblingNotGenerator { channel, sibling });
                            }
                            Some(_) => {}
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
