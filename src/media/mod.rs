// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Media source boundary.
//!
//! The engine consumes `PlaybackSample`s from a channel and does not care
//! where they come from. The only production source is the Windows system
//! media transport controls (gsmtc); other platforms get a clear error at
//! startup. Tests feed the channel directly.

#[cfg(windows)]
pub mod gsmtc_backend;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::transport::PlaybackSample;

/// Producer half of the sample channel handed to a media listener.
pub type SampleSender = mpsc::Sender<PlaybackSample>;

/// Listen to the platform media session and push samples until the
/// session manager ends or the channel closes.
#[cfg(windows)]
pub async fn run_media_listener(samples: SampleSender) -> Result<()> {
    gsmtc_backend::run(samples).await
}

#[cfg(not(windows))]
pub async fn run_media_listener(_samples: SampleSender) -> Result<()> {
    Err(anyhow::anyhow!(
        "No media source available: system media transport controls require Windows"
    ))
}
