//! Fire-and-forget audio facade.
//!
//! The simulation never touches a sound device. It queues `AudioEvent`s
//! here and the front end drains them once per frame. A muted facade drops
//! playback requests silently.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Walk,
    Hit,
    Jump,
    Hurt,
    Death,
    Throw,
    Splash,
    OrcDeath,
    /// Round-robin orc voice clip.
    OrcVoice(u8),
    BossAlert,
    BossAttack,
    /// Two alternating hurt variants.
    BossHurt(u8),
    BossDeath,
    Coin,
    Win,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AudioEvent {
    Play { cue: Cue, pitch: f32, voice: u8 },
    StartLoop(Cue),
    StopLoop(Cue),
    /// Stop every gameplay sound currently playing.
    PauseAll,
}

/// Overlapping coin pickups each get their own voice.
pub const COIN_POOL_SIZE: u8 = 4;

#[derive(Clone, Debug, Default)]
pub struct Audio {
    muted: bool,
    pending: Vec<AudioEvent>,
    looping: Vec<Cue>,
    next_coin_voice: u8,
}

impl Audio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_loops();
        }
    }

    pub fn play(&mut self, cue: Cue) {
        self.play_pitched(cue, 1.0);
    }

    pub fn play_pitched(&mut self, cue: Cue, pitch: f32) {
        if self.muted {
            return;
        }
        self.pending.push(AudioEvent::Play { cue, pitch, voice: 0 });
    }

    /// Plays `cue` on the next voice of the coin pool.
    pub fn play_pooled(&mut self, cue: Cue) {
        let voice = self.next_coin_voice;
        self.next_coin_voice = (voice + 1) % COIN_POOL_SIZE;
        if self.muted {
            return;
        }
        self.pending.push(AudioEvent::Play { cue, pitch: 1.0, voice });
    }

    pub fn start_loop(&mut self, cue: Cue) {
        if self.muted || self.looping.contains(&cue) {
            return;
        }
        self.looping.push(cue);
        self.pending.push(AudioEvent::StartLoop(cue));
    }

    pub fn stop_loop(&mut self, cue: Cue) {
        if let Some(index) = self.looping.iter().position(|&c| c == cue) {
            self.looping.swap_remove(index);
            self.pending.push(AudioEvent::StopLoop(cue));
        }
    }

    fn stop_loops(&mut self) {
        for cue in std::mem::take(&mut self.looping) {
            self.pending.push(AudioEvent::StopLoop(cue));
        }
    }

    pub fn pause_all(&mut self) {
        self.looping.clear();
        self.pending.push(AudioEvent::PauseAll);
    }

    pub fn is_looping(&self, cue: Cue) -> bool {
        self.looping.contains(&cue)
    }

    /// Events queued since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[AudioEvent] {
        &self.pending
    }

    /// How many times `cue` is queued for playback right now.
    pub fn count_pending(&self, cue: Cue) -> usize {
        self.pending
            .iter()
            .filter(|e| matches!(e, AudioEvent::Play { cue: c, .. } if *c == cue))
            .count()
    }
}
