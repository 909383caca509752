// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Keyboard mapping
//!
//! Maps platform keys (winit [`KeyCode`]) to Spectrum keyboard keys. A single
//! platform key may press several Spectrum keys at once: the Spectrum has no
//! cursor or backspace keys, so those are chords with Caps Shift.

use crate::core::error::{PipelineError, Result};
use crate::core::keys::SpectrumKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use winit::keyboard::KeyCode;

/// Default key binding file
pub const DEFAULT_INPUT_CONFIG: &str = "input.toml";

/// One platform key and the Spectrum keys it presses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub key: KeyCode,
    pub spectrum: Vec<SpectrumKey>,
}

/// Input configuration that can be saved/loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(rename = "binding", default)]
    pub bindings: Vec<Binding>,
}

impl InputConfig {
    /// Create default configuration
    pub fn default_config() -> Self {
        use SpectrumKey as S;

        let direct: [(KeyCode, SpectrumKey); 41] = [
            (KeyCode::KeyA, S::A),
            (KeyCode::KeyB, S::B),
            (KeyCode::KeyC, S::C),
            (KeyCode::KeyD, S::D),
            (KeyCode::KeyE, S::E),
            (KeyCode::KeyF, S::F),
            (KeyCode::KeyG, S::G),
            (KeyCode::KeyH, S::H),
            (KeyCode::KeyI, S::I),
            (KeyCode::KeyJ, S::J),
            (KeyCode::KeyK, S::K),
            (KeyCode::KeyL, S::L),
            (KeyCode::KeyM, S::M),
            (KeyCode::KeyN, S::N),
            (KeyCode::KeyO, S::O),
            (KeyCode::KeyP, S::P),
            (KeyCode::KeyQ, S::Q),
            (KeyCode::KeyR, S::R),
            (KeyCode::KeyS, S::S),
            (KeyCode::KeyT, S::T),
            (KeyCode::KeyU, S::U),
            (KeyCode::KeyV, S::V),
            (KeyCode::KeyW, S::W),
            (KeyCode::KeyX, S::X),
            (KeyCode::KeyY, S::Y),
            (KeyCode::KeyZ, S::Z),
            (KeyCode::Digit0, S::Key0),
            (KeyCode::Digit1, S::Key1),
            (KeyCode::Digit2, S::Key2),
            (KeyCode::Digit3, S::Key3),
            (KeyCode::Digit4, S::Key4),
            (KeyCode::Digit5, S::Key5),
            (KeyCode::Digit6, S::Key6),
            (KeyCode::Digit7, S::Key7),
            (KeyCode::Digit8, S::Key8),
            (KeyCode::Digit9, S::Key9),
            (KeyCode::Enter, S::Enter),
            (KeyCode::Space, S::Space),
            (KeyCode::ShiftLeft, S::CapsShift),
            (KeyCode::ShiftRight, S::CapsShift),
            (KeyCode::ControlLeft, S::SymbolShift),
        ];

        let chords: [(KeyCode, [SpectrumKey; 2]); 8] = [
            (KeyCode::Backspace, [S::CapsShift, S::Key0]),
            (KeyCode::ArrowLeft, [S::CapsShift, S::Key5]),
            (KeyCode::ArrowDown, [S::CapsShift, S::Key6]),
            (KeyCode::ArrowUp, [S::CapsShift, S::Key7]),
            (KeyCode::ArrowRight, [S::CapsShift, S::Key8]),
            // BREAK
            (KeyCode::Escape, [S::CapsShift, S::Space]),
            (KeyCode::Comma, [S::SymbolShift, S::N]),
            (KeyCode::Period, [S::SymbolShift, S::M]),
        ];

        let mut bindings: Vec<Binding> = direct
            .into_iter()
            .map(|(key, spectrum)| Binding {
                key,
                spectrum: vec![spectrum],
            })
            .collect();

        bindings.extend(chords.into_iter().map(|(key, spectrum)| Binding {
            key,
            spectrum: spectrum.to_vec(),
        }));

        Self { bindings }
    }

    /// Load configuration from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| {
                PipelineError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| {
            PipelineError::Config(format!("Failed to serialize input config: {}", e))
        })?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Platform key to Spectrum key translation
///
/// # Example
///
/// ```
/// use winit::keyboard::KeyCode;
/// use zxview::core::keys::SpectrumKey;
/// use zxview::frontend::input::{InputConfig, KeyMapping};
///
/// let mapping = KeyMapping::from_config(InputConfig::default_config());
/// assert_eq!(
///     mapping.map(KeyCode::Backspace),
///     &[SpectrumKey::CapsShift, SpectrumKey::Key0]
/// );
/// assert!(mapping.map(KeyCode::F1).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct KeyMapping {
    bindings: HashMap<KeyCode, Vec<SpectrumKey>>,
    config_path: PathBuf,
}

impl KeyMapping {
    /// Load bindings from [`DEFAULT_INPUT_CONFIG`], falling back to the defaults
    pub fn new() -> Self {
        Self::with_config_path(DEFAULT_INPUT_CONFIG)
    }

    /// Load bindings from `config_path`, falling back to the defaults
    pub fn with_config_path(config_path: impl AsRef<Path>) -> Self {
        let config_path = config_path.as_ref();
        let config = InputConfig::load(config_path).unwrap_or_else(|e| {
            log::info!("Using default input config (failed to load: {})", e);
            InputConfig::default_config()
        });

        let mut mapping = Self::from_config(config);
        mapping.config_path = config_path.to_path_buf();
        mapping
    }

    /// Build a mapping from an in-memory configuration
    ///
    /// Later bindings for the same key replace earlier ones.
    pub fn from_config(config: InputConfig) -> Self {
        let bindings = config
            .bindings
            .into_iter()
            .map(|binding| (binding.key, binding.spectrum))
            .collect();

        Self {
            bindings,
            config_path: PathBuf::from(DEFAULT_INPUT_CONFIG),
        }
    }

    /// Spectrum keys pressed by `key`, in press order
    ///
    /// Empty for unmapped keys.
    pub fn map(&self, key: KeyCode) -> &[SpectrumKey] {
        self.bindings.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_binding(&mut self, key: KeyCode, spectrum: Vec<SpectrumKey>) {
        self.bindings.insert(key, spectrum);
    }

    pub fn remove_binding(&mut self, key: KeyCode) {
        self.bindings.remove(&key);
    }

    /// Current bindings, sorted by Spectrum keys for stable output
    pub fn to_config(&self) -> InputConfig {
        let mut bindings: Vec<Binding> = self
            .bindings
            .iter()
            .map(|(&key, spectrum)| Binding {
                key,
                spectrum: spectrum.clone(),
            })
            .collect();
        bindings.sort_by(|a, b| {
            a.spectrum
                .cmp(&b.spectrum)
                .then_with(|| format!("{:?}", a.key).cmp(&format!("{:?}", b.key)))
        });
        InputConfig { bindings }
    }

    /// Save current bindings to the configuration file
    pub fn save_config(&self) -> Result<()> {
        self.to_config().save(&self.config_path)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for KeyMapping {
    fn default() -> Self {
        Self::new()
    }
}
