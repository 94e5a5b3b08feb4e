//! Engine-wide audio facade.
//!
//! The facade tracks volumes, mute state and the current music stream, and
//! turns calls into [`AudioRequest`]s for an [`AudioBackend`]. Mixing and
//! decoding belong to the backend.

use std::{
    cell::RefCell,
    fmt,
    path::{Path, PathBuf},
    rc::Rc,
};

use tessera_core::Result;

/// Category of a sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioKind {
    /// Short, fire-and-forget sound.
    SoundEffect,
    /// Long streamed track; one plays at a time.
    Music,
}

/// Instruction sent to an [`AudioBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum AudioRequest {
    /// Start playing a file.
    Play {
        /// Category of the sound.
        kind: AudioKind,
        /// File to play, already resolved against the category directory.
        path: PathBuf,
        /// Effective volume in `[0, 100]`.
        volume: f32,
        /// Whether playback restarts when it ends.
        looping: bool,
    },
    /// Stop a file that is playing.
    Stop {
        /// Category of the sound.
        kind: AudioKind,
        /// File to stop.
        path: PathBuf,
    },
    /// Change the effective volume of a whole category.
    SetVolume {
        /// Category to adjust.
        kind: AudioKind,
        /// Effective volume in `[0, 100]`.
        volume: f32,
    },
    /// Stop everything.
    StopAll,
}

/// Sink for audio requests, implemented on top of a real mixer.
pub trait AudioBackend {
    /// Carries out a single request.
    fn submit(&mut self, request: AudioRequest) -> Result<()>;
}

/// Backend that plays nothing and remembers every request.
#[derive(Clone, Debug, Default)]
pub struct NullAudioBackend {
    requests: Rc<RefCell<Vec<AudioRequest>>>,
}

impl NullAudioBackend {
    /// Creates a backend with an empty request log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared log of the requests received so far.
    #[must_use]
    pub fn requests(&self) -> Rc<RefCell<Vec<AudioRequest>>> {
        Rc::clone(&self.requests)
    }
}

impl AudioBackend for NullAudioBackend {
    fn submit(&mut self, request: AudioRequest) -> Result<()> {
        log::trace!("audio request {request:?}");
        self.requests.borrow_mut().push(request);
        Ok(())
    }
}

const MAX_VOLUME: f32 = 100.0;

/// Volume bookkeeping in front of an [`AudioBackend`].
///
/// Volumes are percentages. The effective volume of a category is
/// `master * category / 100`, or zero while muted.
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    sound_effects_dir: PathBuf,
    music_dir: PathBuf,
    master: f32,
    sound_effects: f32,
    music: f32,
    muted: bool,
    current_music: Option<PathBuf>,
}

impl fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioManager")
            .field("master", &self.master)
            .field("sound_effects", &self.sound_effects)
            .field("music", &self.music)
            .field("muted", &self.muted)
            .field("current_music", &self.current_music)
            .finish_non_exhaustive()
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullAudioBackend::new()))
    }
}

impl AudioManager {
    /// Creates a facade at full volume over `backend`.
    #[must_use]
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            sound_effects_dir: PathBuf::new(),
            music_dir: PathBuf::new(),
            master: MAX_VOLUME,
            sound_effects: MAX_VOLUME,
            music: MAX_VOLUME,
            muted: false,
            current_music: None,
        }
    }

    /// Replaces the backend. The current music is forgotten.
    pub fn set_backend(&mut self, backend: Box<dyn AudioBackend>) {
        self.backend = backend;
        self.current_music = None;
    }

    /// Directories sound effect and music names are resolved against.
    pub fn set_directories(&mut self, sound_effects: impl AsRef<Path>, music: impl AsRef<Path>) {
        self.sound_effects_dir = sound_effects.as_ref().to_path_buf();
        self.music_dir = music.as_ref().to_path_buf();
    }

    /// Plays a sound effect once.
    pub fn play_sound_effect(&mut self, name: &str) -> Result<()> {
        let request = AudioRequest::Play {
            kind: AudioKind::SoundEffect,
            path: self.sound_effects_dir.join(name),
            volume: self.effective_volume(AudioKind::SoundEffect),
            looping: false,
        };
        self.backend.submit(request)
    }

    /// Starts a music track, stopping the one that was playing.
    pub fn play_music(&mut self, name: &str, looping: bool) -> Result<()> {
        self.stop_music()?;
        let path = self.music_dir.join(name);
        self.backend.submit(AudioRequest::Play {
            kind: AudioKind::Music,
            path: path.clone(),
            volume: self.effective_volume(AudioKind::Music),
            looping,
        })?;
        self.current_music = Some(path);
        Ok(())
    }

    /// Stops the current music track, if any.
    pub fn stop_music(&mut self) -> Result<()> {
        match self.current_music.take() {
            Some(path) => self.backend.submit(AudioRequest::Stop {
                kind: AudioKind::Music,
                path,
            }),
            None => Ok(()),
        }
    }

    /// Path of the music track that is playing.
    #[must_use]
    pub fn current_music(&self) -> Option<&Path> {
        self.current_music.as_deref()
    }

    /// Stops every sound.
    pub fn stop_all(&mut self) -> Result<()> {
        self.current_music = None;
        self.backend.submit(AudioRequest::StopAll)
    }

    /// Master volume percentage.
    #[must_use]
    pub fn master_volume(&self) -> f32 {
        self.master
    }

    /// Sets the master volume, clamped to `[0, 100]`.
    pub fn set_master_volume(&mut self, volume: f32) -> Result<()> {
        self.master = clamp_volume(volume);
        self.push_volumes()
    }

    /// Volume percentage of a category.
    #[must_use]
    pub fn volume(&self, kind: AudioKind) -> f32 {
        match kind {
            AudioKind::SoundEffect => self.sound_effects,
            AudioKind::Music => self.music,
        }
    }

    /// Sets the volume of a category, clamped to `[0, 100]`.
    pub fn set_volume(&mut self, kind: AudioKind, volume: f32) -> Result<()> {
        let volume = clamp_volume(volume);
        match kind {
            AudioKind::SoundEffect => self.sound_effects = volume,
            AudioKind::Music => self.music = volume,
        }
        self.backend.submit(AudioRequest::SetVolume {
            kind,
            volume: self.effective_volume(kind),
        })
    }

    /// Volume the backend is told to use for a category.
    #[must_use]
    pub fn effective_volume(&self, kind: AudioKind) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master * self.volume(kind) / MAX_VOLUME
        }
    }

    /// Silences everything without forgetting the volumes.
    pub fn mute(&mut self) -> Result<()> {
        self.set_muted(true)
    }

    /// Restores the volumes in effect before [`AudioManager::mute`].
    pub fn unmute(&mut self) -> Result<()> {
        self.set_muted(false)
    }

    /// Reports whether audio is muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        if self.muted == muted {
            return Ok(());
        }
        self.muted = muted;
        self.push_volumes()
    }

    fn push_volumes(&mut self) -> Result<()> {
        for kind in [AudioKind::SoundEffect, AudioKind::Music] {
            self.backend.submit(AudioRequest::SetVolume {
                kind,
                volume: self.effective_volume(kind),
            })?;
        }
        Ok(())
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, MAX_VOLUME)
    }
}
