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

//! Program file selection
//!
//! The pipeline only needs "ask the user for a path, maybe get one back".
//! [`DialogFilePicker`] shows a native dialog through `rfd`;
//! [`FixedFilePicker`] answers with a preset path for headless runs and tests.

use std::future::{self, Future};
use std::path::PathBuf;
use std::pin::Pin;

/// Future resolved with the chosen path, or `None` if the user cancelled
pub type PickFuture<'a> = Pin<Box<dyn Future<Output = Option<PathBuf>> + 'a>>;

pub trait FilePicker: Send + Sync {
    fn ask_file(&self) -> PickFuture<'_>;
}

/// Native open-file dialog for Spectrum program images
#[derive(Debug, Clone)]
pub struct DialogFilePicker {
    title: String,
    filter_name: String,
    extensions: Vec<String>,
}

impl DialogFilePicker {
    pub fn new() -> Self {
        Self {
            title: "Select *.z80 or *.tap file".to_string(),
            filter_name: "spectrum program files".to_string(),
            extensions: vec!["z80".to_string(), "tap".to_string()],
        }
    }
}

impl Default for DialogFilePicker {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePicker for DialogFilePicker {
    fn ask_file(&self) -> PickFuture<'_> {
        let dialog = rfd::AsyncFileDialog::new()
            .set_title(&self.title)
            .add_filter(&self.filter_name, self.extensions.as_slice());

        Box::pin(async move {
            dialog
                .pick_file()
                .await
                .map(|handle| handle.path().to_path_buf())
        })
    }
}

/// Picker that always answers with the same path
#[derive(Debug, Clone, Default)]
pub struct FixedFilePicker(Option<PathBuf>);

impl FixedFilePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self(path)
    }
}

impl FilePicker for FixedFilePicker {
    fn ask_file(&self) -> PickFuture<'_> {
        Box::pin(future::ready(self.0.clone()))
    }
}
