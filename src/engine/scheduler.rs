//! Event scheduling
//!
//! Scheduling is not a thread: it attaches start/stop times to voices and
//! hands them to the processing context, which plays them on its own clock.
//! A `Schedule` holds voices timed relative to the moment an effect is
//! triggered; `submit` anchors them to the context clock.

use super::context::{ProcessingContext, VoiceId};
use crate::error::Result;
use crate::synth::Voice;

/// Voices timed relative to an effect's trigger point
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    voices: Vec<Voice>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a voice whose times are already relative to the trigger
    pub fn push(&mut self, voice: Voice) {
        self.voices.push(voice);
    }

    /// Layer another schedule on top of this one, `offset` seconds later
    pub fn layer(&mut self, offset: f64, other: Schedule) -> Result<()> {
        let shifted = other
            .voices
            .into_iter()
            .map(|voice| voice.shifted(offset))
            .collect::<Result<Vec<_>>>()?;
        self.voices.extend(shifted);
        Ok(())
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// When the last voice stops, relative to the trigger
    pub fn end_time(&self) -> f64 {
        self.voices.iter().map(Voice::stop).fold(0.0, f64::max)
    }

    /// Hand every voice to `ctx` in one batch, anchored at its current time
    pub fn submit<C: ProcessingContext + ?Sized>(self, ctx: &mut C) -> Vec<VoiceId> {
        ctx.schedule_all(self.voices)
    }
}

impl Extend<Voice> for Schedule {
    fn extend<I: IntoIterator<Item = Voice>>(&mut self, iter: I) {
        self.voices.extend(iter);
    }
}

impl FromIterator<Voice> for Schedule {
    fn from_iter<I: IntoIterator<Item = Voice>>(iter: I) -> Self {
        Self {
            voices: iter.into_iter().collect(),
        }
    }
}

/// Offsets `0, step, 2 * step, ...` for `count` staggered events
pub fn stagger(step: f64, count: usize) -> impl Iterator<Item = f64> {
    (0..count).map(move |i| i as f64 * step)
}

/// Back-to-back offsets: each start is the sum of the durations before it
pub fn sequential(durations: &[f64]) -> Vec<f64> {
    durations
        .iter()
        .scan(0.0, |elapsed, &d| {
            let start = *elapsed;
            *elapsed += d;
            Some(start)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ContextState, OfflineContext};
    use crate::synth::{schedule_tone, Sustain, Waveform};

    /// Counts how voices reach the context
    struct CountingContext {
        inner: OfflineContext,
        batches: usize,
        singles: usize,
    }

    impl ProcessingContext for CountingContext {
        fn now(&self) -> f64 {
            self.inner.now()
        }

        fn sample_rate(&self) -> f64 {
            self.inner.sample_rate()
        }

        fn state(&self) -> ContextState {
            self.inner.state()
        }

        fn resume(&mut self) -> Result<()> {
            self.inner.resume()
        }

        fn schedule(&mut self, voice: Voice) -> VoiceId {
            self.singles += 1;
            self.inner.schedule(voice)
        }

        fn schedule_all(&mut self, voices: Vec<Voice>) -> Vec<VoiceId> {
            self.batches += 1;
            self.inner.schedule_all(voices)
        }

        fn stop_voice(&mut self, id: VoiceId) -> bool {
            self.inner.stop_voice(id)
        }

        fn is_active(&self, id: VoiceId) -> bool {
            self.inner.is_active(id)
        }

        fn active_voices(&self) -> usize {
            self.inner.active_voices()
        }
    }

    fn note(start: f64) -> Voice {
        schedule_tone(
            start,
            0.2,
            440.0,
            Waveform::Sine,
            0.1,
            Sustain::Struck { decay: 0.2 },
        )
        .unwrap()
    }

    #[test]
    fn test_stagger() {
        let offsets: Vec<f64> = stagger(0.1, 4).collect();
        assert_eq!(offsets.len(), 4);
        for (got, want) in offsets.iter().zip([0.0, 0.1, 0.2, 0.3]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sequential() {
        let offsets = sequential(&[0.3, 0.3, 0.6, 0.3]);
        for (got, want) in offsets.iter().zip([0.0, 0.3, 0.6, 1.2]) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!(sequential(&[]).is_empty());
    }

    #[test]
    fn test_layer_shifts_voices() {
        let inner: Schedule = [note(0.0), note(0.05)].into_iter().collect();

        let mut outer = Schedule::new();
        outer.layer(0.0, inner.clone()).unwrap();
        outer.layer(0.22, inner).unwrap();

        let starts: Vec<f64> = outer.voices().iter().map(Voice::start).collect();
        for (got, want) in starts.iter().zip([0.0, 0.05, 0.22, 0.27]) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!((outer.end_time() - 0.47).abs() < 1e-12);
    }

    #[test]
    fn test_submit_anchors_to_origin() {
        let mut ctx = OfflineContext::new(1000.0, 1.0);
        ctx.render(500);

        let schedule: Schedule = [note(0.0), note(0.1)].into_iter().collect();
        let ids = schedule.submit(&mut ctx);

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(ctx.active_voices(), 2);

        // Both still pending at 0.65s; the first stops at 0.7s
        ctx.render(150);
        assert_eq!(ctx.active_voices(), 2);
        ctx.render(60);
        assert_eq!(ctx.active_voices(), 1);
    }

    #[test]
    fn test_submit_hands_over_one_batch() {
        let mut ctx = CountingContext {
            inner: OfflineContext::new(1000.0, 1.0),
            batches: 0,
            singles: 0,
        };
        let schedule: Schedule = (0..45).map(|i| note(i as f64 * 0.001)).collect();

        let ids = schedule.submit(&mut ctx);
        assert_eq!(ids.len(), 45);
        assert_eq!(ctx.batches, 1);
        assert_eq!(ctx.singles, 0);
        assert_eq!(ctx.active_voices(), 45);
    }

    #[test]
    fn test_layer_rejects_bad_offset() {
        let inner: Schedule = [note(0.0)].into_iter().collect();
        let mut outer = Schedule::new();

        assert!(outer.layer(f64::NAN, inner.clone()).is_err());
        assert!(outer.layer(-0.1, inner).is_err());
        assert!(outer.is_empty());
    }
}
