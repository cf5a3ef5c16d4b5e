//! Channels — one waveform display unit each.
//!
//! A channel is fixed at construction to one of two modes:
//! - **Generating**: samples its own sine configuration every tick
//! - **Composing**: combines the latest traces of sibling generators, and
//!   optionally captures a freehand stroke shown as an overlay

use serde::{Deserialize, Serialize};

use crate::config::ChannelSpec;
use crate::dsp::mixer::CompositionPolicy;
use crate::dsp::oscillator::{SineParams, normalize_degrees};
use crate::dsp::stroke::StrokeBuffer;

/// Who last wrote a generator's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Initial configuration or a user control.
    #[default]
    Manual,
    /// Written back by harmonic analysis.
    Auto,
}

/// State of a generating channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub params: SineParams,
    /// Phase degrees added after every tick.
    pub drift: f64,
    pub source: ConfigSource,
}

impl Generator {
    /// Sample the current configuration, then advance the phase by `drift`.
    fn step(&mut self, width: usize, advance: bool) -> Vec<f64> {
        let samples = self.params.generate(width);
        if advance && self.drift != 0.0 {
            self.params.phase_degrees = normalize_degrees(self.params.phase_degrees + self.drift);
        }
        samples
    }
}

/// State of a composing channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    /// Indices of the generator channels this one reads. Fixed at construction.
    pub siblings: Vec<usize>,
    pub policy: CompositionPolicy,
    /// Present when the channel accepts freehand strokes.
    pub stroke: Option<StrokeBuffer>,
    /// Fit sibling generators to every stroke update.
    pub harmonics: bool,
    pub(crate) dragging: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMode {
    Generating(Generator),
    Composing(Composite),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    id: usize,
    pub(crate) mode: ChannelMode,
    pub(crate) last_sample: Option<Vec<f64>>,
    pub(crate) overlay: Option<Vec<f64>>,
}

impl Channel {
    pub fn from_spec(id: usize, spec: &ChannelSpec) -> Self {
        let mode = match spec {
            ChannelSpec::Generator { drift, .. } => ChannelMode::Generating(Generator {
                params: spec.params().unwrap_or_default(),
                drift: *drift,
                source: ConfigSource::Manual,
            }),
            ChannelSpec::Composite {
                siblings,
                policy,
                capture,
                harmonics,
            } => ChannelMode::Composing(Composite {
                siblings: siblings.clone(),
                policy: *policy,
                stroke: capture.then(StrokeBuffer::new),
                harmonics: *harmonics,
                dragging: false,
            }),
        };
        Channel {
            id,
            mode,
            last_sample: None,
            overlay: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn mode(&self) -> &ChannelMode {
        &self.mode
    }

    pub fn generator(&self) -> Option<&Generator> {
        match &self.mode {
            ChannelMode::Generating(g) => Some(g),
            ChannelMode::Composing(_) => None,
        }
    }

    pub(crate) fn generator_mut(&mut self) -> Option<&mut Generator> {
        match &mut self.mode {
            ChannelMode::Generating(g) => Some(g),
            ChannelMode::Composing(_) => None,
        }
    }

    pub fn composite(&self) -> Option<&Composite> {
        match &self.mode {
            ChannelMode::Composing(c) => Some(c),
            ChannelMode::Generating(_) => None,
        }
    }

    pub(crate) fn composite_mut(&mut self) -> Option<&mut Composite> {
        match &mut self.mode {
            ChannelMode::Composing(c) => Some(c),
            ChannelMode::Generating(_) => None,
        }
    }

    pub fn stroke(&self) -> Option<&StrokeBuffer> {
        self.composite().and_then(|c| c.stroke.as_ref())
    }

    /// The trace produced by the latest tick. `None` for a composite with
    /// nothing to show.
    pub fn last_sample(&self) -> Option<&[f64]> {
        self.last_sample.as_deref()
    }

    /// The wrapped freehand stroke, if one has been drawn.
    pub fn overlay(&self) -> Option<&[f64]> {
        self.overlay.as_deref().filter(|o| !o.is_empty())
    }

    /// Regenerate a generating channel's trace. No-op for composites.
    pub(crate) fn generate(&mut self, width: usize, advance: bool) {
        if let ChannelMode::Generating(g) = &mut self.mode {
            self.last_sample = Some(g.step(width, advance));
        }
    }

    /// Re-tile the captured stroke at the current width.
    pub(crate) fn rewrap(&mut self, width: usize) {
        self.overlay = self.stroke().and_then(|s| s.wrap(width));
    }
}

/// What a renderer needs for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    /// Primary trace (generated or composed).
    pub samples: Option<&'a [f64]>,
    /// Freehand overlay, drawn as the primary trace when present.
    pub overlay: Option<&'a [f64]>,
}

impl Frame<'_> {
    /// Composed trace should be drawn in the secondary style.
    pub fn overlay_shown(&self) -> bool {
        self.overlay.is_some()
    }
}

impl<'a> From<&'a Channel> for Frame<'a> {
    fn from(channel: &'a Channel) -> Self {
        Frame {
            samples: channel.last_sample(),
            overlay: channel.overlay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_from_spec() {
        let spec = ChannelSpec::Generator {
            frequency: 1000.0,
            amplitude: 50.0,
            phase_degrees: 350.0,
            drift: 20.0,
        };
        let mut ch = Channel::from_spec(0, &spec);
        assert!(ch.composite().is_none());
        assert_eq!(ch.generator().unwrap().source, ConfigSource::Manual);

        ch.generate(16, true);
        assert_eq!(ch.last_sample().unwrap().len(), 16);
        let first = ch.last_sample().unwrap()[0];
        assert!((first - 0.5 * 350.0f64.to_radians().sin()).abs() < 1e-12, "got {first}");
        // 350 + 20 wraps to 10
        assert!((ch.generator().unwrap().params.phase_degrees - 10.0).abs() < 1e-9);
    }

    #[test]
    fn generate_without_advance_keeps_phase() {
        let spec = ChannelSpec::Generator {
            frequency: 1.0,
            amplitude: 1.0,
            phase_degrees: 30.0,
            drift: 5.0,
        };
        let mut ch = Channel::from_spec(0, &spec);
        ch.generate(4, false);
        assert_eq!(ch.generator().unwrap().params.phase_degrees, 30.0);
    }

    #[test]
    fn composite_capture_flag() {
        let spec = ChannelSpec::Composite {
            siblings: vec![0, 1],
            policy: CompositionPolicy::Sum,
            capture: true,
            harmonics: false,
        };
        let mut ch = Channel::from_spec(2, &spec);
        assert_eq!(ch.id(), 2);
        assert!(ch.generator().is_none());
        assert!(ch.stroke().is_some());

        ch.generate(8, true);
        assert_eq!(ch.last_sample(), None);
        ch.rewrap(8);
        assert_eq!(Frame::from(&ch).overlay, None);
        assert!(!Frame::from(&ch).overlay_shown());
    }

    #[test]
    fn composite_without_capture_has_no_stroke() {
        let spec = ChannelSpec::Composite {
            siblings: vec![],
            policy: CompositionPolicy::Mean,
            capture: false,
            harmonics: false,
        };
        assert!(Channel::from_spec(0, &spec).stroke().is_none());
    }
}
