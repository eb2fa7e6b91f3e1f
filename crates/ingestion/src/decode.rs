//! Datagram decoding

use contracts::{InputRepresentation, RawStateSample, WireFormat};

use crate::error::{IngestionError, Result};

/// Decode one datagram into a sample
pub fn decode_sample(bytes: &[u8], format: WireFormat, source_id: &str) -> Result<RawStateSample> {
    match format {
        WireFormat::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
        WireFormat::Bincode => bincode::deserialize(bytes).map_err(|e| e.to_string()),
    }
    .map_err(|message| IngestionError::DecodeFailed {
        source_id: source_id.to_string(),
        message,
    })
}

/// Encode a sample the way [`decode_sample`] expects it
pub fn encode_sample(sample: &RawStateSample, format: WireFormat) -> Result<Vec<u8>> {
    match format {
        WireFormat::Json => serde_json::to_vec(sample).map_err(|e| e.to_string()),
        WireFormat::Bincode => bincode::serialize(sample).map_err(|e| e.to_string()),
    }
    .map_err(|message| IngestionError::EncodeFailed { message })
}

/// Reject samples whose orientation variant differs from the deployment's
pub fn check_representation(
    sample: &RawStateSample,
    expected: InputRepresentation,
    source_id: &str,
) -> Result<()> {
    let found = sample.orientation.representation();
    if found == expected {
        Ok(())
    } else {
        Err(IngestionError::RepresentationMismatch {
            source_id: source_id.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}
