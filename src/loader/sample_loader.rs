use std::path::{Path, PathBuf};

use crate::audio::{next_sample_id, LoadError, SampleBuffer, SampleId};

// A decoded sound, ready to be registered with the engine
#[derive(Clone, Debug)]
pub struct LoadedSound {
    pub name: String,
    pub id: SampleId,
    pub buffer: SampleBuffer,
}

// <dir>/<name>.wav
pub fn sound_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.wav"))
}

// Load a WAV from disk, prepare for registration with the engine
pub fn load(path: &Path, target_rate: u32) -> Result<(SampleId, SampleBuffer), LoadError> {
    let buffer = SampleBuffer::load_wav(path, target_rate)?;
    Ok((next_sample_id(), buffer))
}

// Decode every named sound that exists in `dir`. Names that fail to load are
// left out; the pool then treats them as unknown and pads bound to them stay
// silent.
pub fn load_sounds<'a>(
    dir: &Path,
    names: impl IntoIterator<Item = &'a str>,
    target_rate: u32,
) -> Vec<LoadedSound> {
    let mut loaded: Vec<LoadedSound> = Vec::new();
    for name in names {
        if loaded.iter().any(|s| s.name == name) {
            continue;
        }
        let path = sound_path(dir, name);
        match load(&path, target_rate) {
            Ok((id, buffer)) => {
                log::info!("loaded sound '{}' ({} frames) from {}", name, buffer.len(), path.display());
                loaded.push(LoadedSound { name: name.to_string(), id, buffer });
            }
            Err(e) => log::warn!("sound '{}' unavailable ({}): {}", name, path.display(), e),
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("deckpad-loader-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_sounds_skips_missing_and_duplicates() {
        let dir = temp_dir("skip");
        write_wav(&sound_path(&dir, "bass"), &[0, 100, 200, 300]);

        let loaded = load_sounds(&dir, ["bass", "beats", "bass"], 8000);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "bass");
        assert_eq!(loaded[0].buffer.len(), 4);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_sounds_resamples_to_target() {
        let dir = temp_dir("rate");
        write_wav(&sound_path(&dir, "scratch"), &[0; 80]);

        let loaded = load_sounds(&dir, ["scratch"], 16000);
        assert_eq!(loaded[0].buffer.len(), 160);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = load(Path::new("/definitely/not/here.wav"), 44100).unwrap_err();
        assert!(matches!(err, LoadError::Wav(_) | LoadError::Io(_)));
    }
}
