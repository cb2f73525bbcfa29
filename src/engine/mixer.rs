//! Voice mixer
//!
//! The renderer behind every processing context. A sample counter is the
//! monotonic clock; each `process()` call renders one mono frame by summing
//! the voices sounding at that instant and retires voices past their stop
//! time.

use super::context::VoiceId;
use crate::synth::{ActiveVoice, Voice};

/// Sample-accurate mixer of scheduled voices
pub struct VoiceMixer {
    sample_rate: f64,
    volume: f64,
    position: u64,
    next_id: u64,
    voices: Vec<(VoiceId, ActiveVoice)>,
}

impl VoiceMixer {
    /// Create a mixer at the given sample rate and master volume
    pub fn new(sample_rate: f64, volume: f64) -> Self {
        Self {
            sample_rate,
            volume: volume.clamp(0.0, 1.0),
            position: 0,
            next_id: 0,
            voices: Vec::new(),
        }
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Current clock time in seconds
    pub fn now(&self) -> f64 {
        self.position as f64 / self.sample_rate
    }

    /// Frames rendered so far
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Set master volume (0.0-1.0)
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Queue a voice for rendering
    pub fn schedule(&mut self, voice: Voice) -> VoiceId {
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.voices.push((id, voice.activate(self.sample_rate)));
        id
    }

    /// Queue voices timed relative to the current clock position
    pub fn schedule_all(&mut self, voices: impl IntoIterator<Item = Voice>) -> Vec<VoiceId> {
        let origin = self.now();
        voices
            .into_iter()
            .map(|voice| self.schedule(voice.anchored(origin)))
            .collect()
    }

    /// Check if a voice is still pending or sounding
    pub fn is_active(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|(voice_id, _)| *voice_id == id)
    }

    /// Remove a voice before its natural stop time
    pub fn stop(&mut self, id: VoiceId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|(voice_id, _)| *voice_id != id);
        self.voices.len() != before
    }

    /// Number of voices not yet retired
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Generate the next sample (mix of all voices)
    pub fn process(&mut self) -> f64 {
        let frame = self.position;
        let mut output = 0.0;

        self.voices.retain_mut(|(_, voice)| {
            if voice.is_finished(frame) {
                return false;
            }
            output += voice.render(frame);
            true
        });

        self.position += 1;
        output * self.volume
    }

    /// Fill a buffer with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{schedule_tone, Sustain, Waveform};

    fn tone(start: f64, duration: f64) -> Voice {
        schedule_tone(
            start,
            duration,
            440.0,
            Waveform::Triangle,
            0.5,
            Sustain::Swell {
                attack: 0.001,
                decay: duration,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_mixer_clock() {
        let mut mixer = VoiceMixer::new(1000.0, 1.0);
        assert_eq!(mixer.now(), 0.0);

        for _ in 0..500 {
            mixer.process();
        }
        assert_eq!(mixer.position(), 500);
        assert!((mixer.now() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_voices_retire_at_stop_time() {
        let mut mixer = VoiceMixer::new(1000.0, 1.0);
        mixer.schedule(tone(0.0, 0.1));
        mixer.schedule(tone(0.05, 0.1));
        assert_eq!(mixer.active_voices(), 2);

        let mut buffer = vec![0.0f32; 120];
        mixer.fill_buffer(&mut buffer);
        assert_eq!(mixer.active_voices(), 1);

        let mut buffer = vec![0.0f32; 100];
        mixer.fill_buffer(&mut buffer);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_future_voice_is_silent_until_start() {
        let mut mixer = VoiceMixer::new(1000.0, 1.0);
        mixer.schedule(tone(0.2, 0.1));

        let mut before = vec![0.0f32; 200];
        mixer.fill_buffer(&mut before);
        assert!(before.iter().all(|&s| s == 0.0));

        let mut during = vec![0.0f32; 100];
        mixer.fill_buffer(&mut during);
        assert!(during.iter().any(|&s| s.abs() > 0.0));
    }

    #[test]
    fn test_stop_removes_voice() {
        let mut mixer = VoiceMixer::new(1000.0, 1.0);
        let id = mixer.schedule(tone(0.0, 1.0));

        assert!(mixer.stop(id));
        assert_eq!(mixer.active_voices(), 0);

        // Second stop is a harmless no-op
        assert!(!mixer.stop(id));
    }

    #[test]
    fn test_schedule_all_anchors_at_clock() {
        let mut mixer = VoiceMixer::new(1000.0, 1.0);
        for _ in 0..250 {
            mixer.process();
        }

        let ids = mixer.schedule_all([tone(0.0, 0.1), tone(0.05, 0.1)]);
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|&id| mixer.is_active(id)));

        // Retired on the frames at 0.35s and 0.40s of the mixer clock
        let mut buffer = vec![0.0f32; 101];
        mixer.fill_buffer(&mut buffer);
        assert!(!mixer.is_active(ids[0]));
        assert!(mixer.is_active(ids[1]));

        let mut buffer = vec![0.0f32; 50];
        mixer.fill_buffer(&mut buffer);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_master_volume() {
        let mut loud = VoiceMixer::new(44100.0, 1.0);
        let mut quiet = VoiceMixer::new(44100.0, 0.5);
        loud.schedule(tone(0.0, 0.1));
        quiet.schedule(tone(0.0, 0.1));

        for _ in 0..1000 {
            let a = loud.process();
            let b = quiet.process();
            assert!((a * 0.5 - b).abs() < 1e-12);
        }

        quiet.set_volume(3.0);
        assert_eq!(quiet.volume(), 1.0);
    }
}
