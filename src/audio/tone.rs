use std::f32::consts::PI;

/// Sine oscillator with a gain that glides to its target.
/// Keying it on and off through the ramp keeps the edges from clicking.
#[derive(Clone, Copy, Debug)]
pub struct Oscillator {
    i: u64,
    tone: f32,
    sample_rate: f32,
    gain: f32,
    target: f32,
    /// Gain change per sample while ramping
    step: f32,
}

impl Oscillator {
    /// Ramp applied when keying, in seconds.
    pub const RAMP: f32 = 0.005;

    pub fn new(tone: f32, sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f32;
        Self {
            i: 0,
            tone,
            sample_rate,
            gain: 0.0,
            target: 0.0,
            step: (Self::RAMP * sample_rate).recip(),
        }
    }

    /// Overrides the ramp length.
    /// A ramp of zero switches the gain instantly.
    pub fn ramp(mut self, seconds: f32) -> Self {
        self.step = match seconds * self.sample_rate {
            samples if samples < 1.0 => f32::INFINITY,
            samples => samples.recip(),
        };
        self
    }

    /// Sets the gain the oscillator moves towards.
    pub fn key(&mut self, gain: f32) {
        self.target = gain;
    }

    pub fn set_tone(&mut self, tone: f32) {
        self.tone = tone;
        self.i = 0;
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_silent(&self) -> bool {
        self.gain == 0.0 && self.target == 0.0
    }
}

impl Iterator for Oscillator {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_silent() {
            self.i = 0;
            return Some(0.0);
        }

        let delta = self.target - self.gain;
        self.gain = match delta.abs() <= self.step {
            true => self.target,
            false => self.gain + self.step.copysign(delta),
        };

        self.i += 1;
        let phase = (self.i as f32 * self.tone / self.sample_rate).fract();
        Some((phase * 2.0 * PI).sin() * self.gain)
    }
}
