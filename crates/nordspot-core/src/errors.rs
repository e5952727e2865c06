// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of NordSpot.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Error types for upstream price requests

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode upstream payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected upstream payload: {0}")]
    Format(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Coarse failure class, used when a failure is collapsed into "no data"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The upstream could not be asked (network, timeout, HTTP status)
    Transport,
    /// The upstream answered with something we could not interpret
    Format,
    /// The request could not be built from local settings
    Config,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Http(_) | Self::Status { .. } => FailureKind::Transport,
            Self::Json(_) | Self::Format(_) => FailureKind::Format,
            Self::Config(_) => FailureKind::Config,
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
