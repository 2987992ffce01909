//! Footstep audio cues
//!
//! Footstep events become playable cues: a random sample variant with a
//! little volume and pitch jitter, never closer together than the minimum
//! interval. Playback itself belongs to the host through [`CuePlayer`].

use crate::config::FootstepAudioConfig;
use crate::gait::{Foot, FootstepEvent};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Receiver for footstep events
pub trait FootstepSink {
    fn footstep(&mut self, event: &FootstepEvent);
}

impl<F> FootstepSink for F
where
    F: FnMut(&FootstepEvent),
{
    fn footstep(&mut self, event: &FootstepEvent) {
        self(event)
    }
}

/// One sound to play
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FootstepCue {
    pub foot: Foot,
    /// Sample variant, starting at 1
    pub variant: u32,
    pub volume: f32,
    pub playback_rate: f32,
    /// Controller time of the step (seconds)
    pub time: f64,
}

impl FootstepCue {
    /// Sample name, e.g. `footstep_2`
    pub fn sample_name(&self) -> String {
        format!("footstep_{}", self.variant)
    }
}

/// Rate limiter and jitter source for footstep cues
#[derive(Clone, Debug)]
pub struct FootstepLimiter {
    config: FootstepAudioConfig,
    rng: ChaCha8Rng,
    last: Option<f64>,
    suppressed: u64,
}

impl FootstepLimiter {
    pub fn new(config: FootstepAudioConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            last: None,
            suppressed: 0,
        }
    }

    /// Steps dropped for arriving inside the minimum interval
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    /// Turn an event into a cue, or `None` if it is too soon after the last
    pub fn cue(&mut self, event: &FootstepEvent) -> Option<FootstepCue> {
        if let Some(last) = self.last {
            if event.time - last < f64::from(self.config.min_interval) {
                self.suppressed += 1;
                tracing::trace!(time = event.time, "footstep rate limited");
                return None;
            }
        }
        self.last = Some(event.time);

        let variant = self.rng.random_range(1..=self.config.variants.max(1));
        let volume = self.config.volume_min + self.rng.random::<f32>() * self.config.volume_jitter;
        let playback_rate = self.config.rate_min + self.rng.random::<f32>() * self.config.rate_jitter;

        Some(FootstepCue {
            foot: event.foot,
            variant,
            volume,
            playback_rate,
            time: event.time,
        })
    }
}

/// Host audio playback
pub trait CuePlayer {
    fn play(&mut self, cue: &FootstepCue);
}

impl<F> CuePlayer for F
where
    F: FnMut(&FootstepCue),
{
    fn play(&mut self, cue: &FootstepCue) {
        self(cue)
    }
}

/// Footstep sink that rate-limits into a [`CuePlayer`]
#[derive(Debug)]
pub struct FootstepAudio<P> {
    limiter: FootstepLimiter,
    player: P,
}

impl<P: CuePlayer> FootstepAudio<P> {
    pub fn new(config: FootstepAudioConfig, player: P) -> Self {
        Self {
            limiter: FootstepLimiter::new(config),
            player,
        }
    }

    pub fn limiter(&self) -> &FootstepLimiter {
        &self.limiter
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn into_player(self) -> P {
        self.player
    }
}

impl<P: CuePlayer> FootstepSink for FootstepAudio<P> {
    fn footstep(&mut self, event: &FootstepEvent) {
        if let Some(cue) = self.limiter.cue(event) {
            self.player.play(&cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(foot: Foot, time: f64) -> FootstepEvent {
        FootstepEvent { foot, time }
    }

    #[test]
    fn test_minimum_interval() {
        let mut limiter = FootstepLimiter::new(FootstepAudioConfig::default());

        assert!(limiter.cue(&step(Foot::Right, 1.0)).is_some());
        assert!(limiter.cue(&step(Foot::Left, 1.05)).is_none());
        assert!(limiter.cue(&step(Foot::Left, 1.109)).is_none());
        assert!(limiter.cue(&step(Foot::Left, 1.11)).is_some());
        assert_eq!(limiter.suppressed(), 2);
    }

    #[test]
    fn test_cue_ranges() {
        let mut limiter = FootstepLimiter::new(FootstepAudioConfig::default());
        for i in 0..500 {
            let cue = limiter.cue(&step(Foot::Right, f64::from(i))).unwrap();
            assert!((1..=3).contains(&cue.variant));
            assert!((0.6..=0.75).contains(&cue.volume));
            assert!((0.95..=1.05).contains(&cue.playback_rate));
        }
    }

    #[test]
    fn test_seeded_cues_repeat() {
        let config = FootstepAudioConfig::default();
        let mut a = FootstepLimiter::new(config.clone());
        let mut b = FootstepLimiter::new(config);
        for i in 0..20 {
            let event = step(Foot::Left, f64::from(i));
            assert_eq!(a.cue(&event), b.cue(&event));
        }
    }

    #[test]
    fn test_audio_sink_plays_cues() {
        let mut played = Vec::new();
        {
            let mut audio = FootstepAudio::new(FootstepAudioConfig::default(), |cue: &FootstepCue| {
                played.push(cue.sample_name())
            });
            audio.footstep(&step(Foot::Right, 0.0));
            audio.footstep(&step(Foot::Left, 0.01));
            audio.footstep(&step(Foot::Left, 0.5));
            assert_eq!(audio.limiter().suppressed(), 1);
        }
        assert_eq!(played.len(), 2);
        assert!(played.iter().all(|name| name.starts_with("footstep_")));
    }
}
