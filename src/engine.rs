//! Scope engine — owns every channel and drives them per tick.
//!
//! The host page calls [`ScopeEngine::tick`] once per animation frame,
//! forwards resize and pointer-drag events, and reads back each channel's
//! [`Frame`] for drawing. Generators are processed before composites so a
//! composite always combines traces from the same tick.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::channel::{Channel, ChannelMode, ConfigSource, Frame};
use crate::config::ScopeConfig;
use crate::dsp::harmonic::{self, HarmonicComponent};
use crate::dsp::oscillator::SineParams;
use crate::dsp::stroke::Viewport;
use crate::error::{CompositeError, ConfigError, Result, ScopeError};

/// Strokes may reach this many display widths past either edge.
const REACH_WIDTHS: i64 = 4;

/// Pointer drag phase as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Start,
    Move,
    End,
}

/// Orchestrator context for one scope surface.
#[derive(Debug, Clone)]
pub struct ScopeEngine {
    channels: Vec<Channel>,
    width: usize,
    viewport: Viewport,
    harmonic_count: usize,
}

impl ScopeEngine {
    /// Build the channel set and render an initial frame.
    pub fn new(config: &ScopeConfig) -> Result<Self> {
        config.validate()?;
        let channels = config
            .channels
            .iter()
            .enumerate()
            .map(|(id, spec)| Channel::from_spec(id, spec))
            .collect();
        let mut engine = ScopeEngine {
            channels,
            width: config.width,
            viewport: config.viewport(),
            harmonic_count: config.harmonic_count,
        };
        debug!(
            "scope engine: {} channels, width {}",
            engine.channels.len(),
            engine.width
        );
        for err in engine.render(false) {
            warn!("initial render: {err}");
        }
        Ok(engine)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: usize) -> Result<&Channel> {
        self.channels.get(id).ok_or(ScopeError::UnknownChannel(id))
    }

    fn channel_mut(&mut self, id: usize) -> Result<&mut Channel> {
        self.channels.get_mut(id).ok_or(ScopeError::UnknownChannel(id))
    }

    pub fn frame(&self, id: usize) -> Result<Frame<'_>> {
        self.channel(id).map(Frame::from)
    }

    /// Advance one animation frame.
    ///
    /// Returns the failures of individual channels; every other channel
    /// has still been rendered.
    pub fn tick(&mut self) -> Vec<ScopeError> {
        trace!("tick");
        self.render(true)
    }

    /// Change the horizontal resolution and optionally the vertical extent.
    /// All fixed-length traces are recomputed immediately; captured strokes
    /// are kept.
    pub fn resize(&mut self, width: usize, height: Option<f64>) -> Result<Vec<ScopeError>> {
        if let Some(height) = height {
            let viewport = Viewport::new(height, self.viewport.margin);
            if !height.is_finite() || viewport.onset(height / 2.0).is_none() {
                return Err(ConfigError::EmptyViewport {
                    height,
                    margin: self.viewport.margin,
                }
                .into());
            }
            self.viewport = viewport;
        }
        debug!("resize to {width} px");
        self.width = width;
        Ok(self.render(false))
    }

    fn render(&mut self, advance: bool) -> Vec<ScopeError> {
        let width = self.width;
        for channel in &mut self.channels {
            channel.generate(width, advance);
        }

        let mut failures = Vec::new();
        for id in 0..self.channels.len() {
            let composed = match &self.channels[id].mode {
                ChannelMode::Composing(composite) => {
                    let traces: Vec<&[f64]> = composite
                        .siblings
                        .iter()
                        .filter_map(|&s| self.channels[s].last_sample())
                        .collect();
                    composite.policy.combine(&traces)
                }
                ChannelMode::Generating(_) => continue,
            };
            let channel = &mut self.channels[id];
            channel.rewrap(width);
            channel.last_sample = match composed {
                Ok(samples) => Some(samples),
                Err(CompositeError::Degenerate) => {
                    trace!("channel {id}: no siblings to compose");
                    None
                }
                Err(source) => {
                    warn!("channel {id}: {source}");
                    failures.push(ScopeError::Composite { channel: id, source });
                    None
                }
            };
        }
        failures
    }

    /// Forward a pointer drag over a capture channel.
    ///
    /// `Start` arms the drag, `End` disarms it. `Move` on an armed drag
    /// records the point, re-tiles the overlay and, for analysing channels,
    /// writes the strongest harmonics back into the sibling generators.
    /// Points further than [`REACH_WIDTHS`] widths outside the display are
    /// dropped. Returns whether a point was recorded.
    pub fn drag(&mut self, id: usize, pixel_x: i64, y: f64, phase: DragPhase) -> Result<bool> {
        let width = self.width;
        let harmonic_count = self.harmonic_count;
        let value = self.viewport.onset(y);

        let channel = self.channel_mut(id)?;
        let composite = channel
            .composite_mut()
            .filter(|c| c.stroke.is_some())
            .ok_or(ScopeError::NotCaptureCapable(id))?;

        match phase {
            DragPhase::Start => {
                composite.dragging = true;
                return Ok(false);
            }
            DragPhase::End => {
                composite.dragging = false;
                return Ok(false);
            }
            DragPhase::Move if !composite.dragging => return Ok(false),
            DragPhase::Move => {}
        }
        let Some(value) = value else {
            trace!("channel {id}: y={y} outside plotting band");
            return Ok(false);
        };
        let reach = REACH_WIDTHS * width.max(1) as i64;
        if pixel_x < -reach || pixel_x >= width as i64 + reach {
            debug!("channel {id}: x={pixel_x} beyond stroke reach {reach}");
            return Ok(false);
        }

        let Some(stroke) = composite.stroke.as_mut() else {
            return Err(ScopeError::NotCaptureCapable(id));
        };
        stroke.record_point(pixel_x, value);

        let fitted = if composite.harmonics {
            harmonic::extract(stroke, harmonic_count, composite.siblings.len())
                .map(|params| (composite.siblings.clone(), params))
        } else {
            None
        };
        channel.rewrap(width);

        if let Some((siblings, params)) = fitted {
            for (sibling, params) in siblings.into_iter().zip(params) {
                self.set_params(sibling, params, ConfigSource::Auto)?;
            }
        }
        Ok(true)
    }

    /// Ranked harmonic components of a capture channel's stroke, strongest
    /// first. Empty until something has been drawn.
    pub fn candidates(&self, id: usize) -> Result<Vec<HarmonicComponent>> {
        let stroke = self
            .channel(id)?
            .stroke()
            .ok_or(ScopeError::NotCaptureCapable(id))?;
        Ok(match stroke.origin() {
            Some(origin) => harmonic::candidates(stroke.dense(), origin, self.harmonic_count),
            None => Vec::new(),
        })
    }

    /// Forget every captured stroke.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            if let Some(stroke) = channel.composite_mut().and_then(|c| c.stroke.as_mut()) {
                stroke.clear();
                channel.overlay = None;
                debug!("channel {}: stroke cleared", channel.id());
            }
        }
    }

    pub fn params(&self, id: usize) -> Result<SineParams> {
        self.channel(id)?
            .generator()
            .map(|g| g.params)
            .ok_or(ScopeError::NotAGenerator(id))
    }

    pub fn config_source(&self, id: usize) -> Result<ConfigSource> {
        self.channel(id)?
            .generator()
            .map(|g| g.source)
            .ok_or(ScopeError::NotAGenerator(id))
    }

    /// Write a generator configuration, recording who wrote it. Takes
    /// effect on the next tick.
    pub fn set_params(&mut self, id: usize, params: SineParams, source: ConfigSource) -> Result<()> {
        let generator = self
            .channel_mut(id)?
            .generator_mut()
            .ok_or(ScopeError::NotAGenerator(id))?;
        generator.params = params;
        generator.source = source;
        Ok(())
    }
}
