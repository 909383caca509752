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

//! ZX Spectrum keyboard keys
//!
//! The Spectrum keyboard is an 8x5 matrix of 40 keys. The emulator receives
//! presses and releases of these logical keys; translating platform key
//! events into them is the job of [`crate::frontend::input::KeyMapping`].

use serde::{Deserialize, Serialize};

/// Logical key on the Spectrum keyboard matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpectrumKey {
    // Row 0xFE
    CapsShift,
    Z,
    X,
    C,
    V,
    // Row 0xFD
    A,
    S,
    D,
    F,
    G,
    // Row 0xFB
    Q,
    W,
    E,
    R,
    T,
    // Row 0xF7
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    // Row 0xEF
    Key0,
    Key9,
    Key8,
    Key7,
    Key6,
    // Row 0xDF
    P,
    O,
    I,
    U,
    Y,
    // Row 0xBF
    Enter,
    L,
    K,
    J,
    H,
    // Row 0x7F
    Space,
    SymbolShift,
    M,
    N,
    B,
}

impl SpectrumKey {
    /// All keys in matrix order
    pub const ALL: [SpectrumKey; 40] = [
        SpectrumKey::CapsShift,
        SpectrumKey::Z,
        SpectrumKey::X,
        SpectrumKey::C,
        SpectrumKey::V,
        SpectrumKey::A,
        SpectrumKey::S,
        SpectrumKey::D,
        SpectrumKey::F,
        SpectrumKey::G,
        SpectrumKey::Q,
        SpectrumKey::W,
        SpectrumKey::E,
        SpectrumKey::R,
        SpectrumKey::T,
        SpectrumKey::Key1,
        SpectrumKey::Key2,
        SpectrumKey::Key3,
        SpectrumKey::Key4,
        SpectrumKey::Key5,
        SpectrumKey::Key0,
        SpectrumKey::Key9,
        SpectrumKey::Key8,
        SpectrumKey::Key7,
        SpectrumKey::Key6,
        SpectrumKey::P,
        SpectrumKey::O,
        SpectrumKey::I,
        SpectrumKey::U,
        SpectrumKey::Y,
        SpectrumKey::Enter,
        SpectrumKey::L,
        SpectrumKey::K,
        SpectrumKey::J,
        SpectrumKey::H,
        SpectrumKey::Space,
        SpectrumKey::SymbolShift,
        SpectrumKey::M,
        SpectrumKey::N,
        SpectrumKey::B,
    ];
}
