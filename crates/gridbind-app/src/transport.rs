// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Opaque round-trip encoding of [`GridViewState`].
//!
//! Blobs are base64 over compact JSON. Consumers must treat them as opaque;
//! there is no version marker and no compatibility promise across releases.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::warn;

use crate::{GridError, GridResult, GridViewState};

pub fn encode_state(state: &GridViewState) -> GridResult<String> {
    let json =
        serde_json::to_vec(state).map_err(|error| GridError::StateDecode(error.to_string()))?;
    Ok(BASE64.encode(json))
}

pub fn decode_state(blob: &str) -> GridResult<GridViewState> {
    let bytes = BASE64
        .decode(blob.trim())
        .map_err(|error| GridError::StateDecode(format!("invalid base64: {error}")))?;
    let state: GridViewState = serde_json::from_slice(&bytes)
        .map_err(|error| GridError::StateDecode(format!("invalid state payload: {error}")))?;
    state.check()?;
    Ok(state)
}

impl GridViewState {
    /// State carried by a request: fresh when there is none, and fresh (with
    /// a warning) when the blob cannot be decoded.
    pub fn restore(blob: Option<&str>) -> Self {
        match blob.map(str::trim).filter(|blob| !blob.is_empty()) {
            None => Self::default(),
            Some(blob) => decode_state(blob).unwrap_or_else(|error| {
                warn!(%error, "discarding undecodable grid state");
                Self::default()
            }),
        }
    }

    pub fn encode(&self) -> GridResult<String> {
        encode_state(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_state, encode_state};
    use crate::{GridError, GridViewState, SearchOperator, SortDirection};
    use anyhow::Result;

    fn busy_state() -> GridViewState {
        let mut state = GridViewState {
            page_index: 2,
            ..GridViewState::default()
        };
        state.set_sort("price", SortDirection::Desc);
        state.set_filter_index(1);
        state.set_search("name", SearchOperator::Between, "a'b", "z|y");
        state.page_count = 5;
        state.total_record_count = 93;
        state
    }

    #[test]
    fn blob_round_trips_without_loss() -> Result<()> {
        let state = busy_state();
        let blob = encode_state(&state)?;
        let decoded = decode_state(&blob)?;
        assert_eq!(decoded, state);
        assert_eq!(encode_state(&decoded)?, blob);
        Ok(())
    }

    #[test]
    fn blob_is_not_plain_json() -> Result<()> {
        let blob = encode_state(&GridViewState::default())?;
        assert!(!blob.contains('{'));
        Ok(())
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode_state("not base64!"),
            Err(GridError::StateDecode(_))
        ));
        assert!(matches!(
            decode_state("e30="),
            Err(GridError::StateDecode(_))
        ));
    }

    #[test]
    fn tampered_page_index_is_rejected() -> Result<()> {
        let state = GridViewState {
            page_index: -3,
            ..GridViewState::default()
        };
        let blob = encode_state(&state)?;
        assert!(matches!(
            decode_state(&blob),
            Err(GridError::StateDecode(message)) if message.contains("page index")
        ));
        assert_eq!(GridViewState::restore(Some(&blob)), GridViewState::default());
        Ok(())
    }

    #[test]
    fn restore_falls_back_to_fresh_state() -> Result<()> {
        assert_eq!(GridViewState::restore(None), GridViewState::default());
        assert_eq!(GridViewState::restore(Some("  ")), GridViewState::default());
        assert_eq!(
            GridViewState::restore(Some("%%%")),
            GridViewState::default()
        );
        let state = busy_state();
        assert_eq!(GridViewState::restore(Some(&state.encode()?)), state);
        Ok(())
    }
}
