pub mod arcs;
pub mod error;
pub mod graph_shapes;
pub mod schema;
pub mod situation_map;
pub mod value;
pub mod world;

pub use error::ShapeMismatch;
pub use schema::{DocumentShape, Extraction, SituationRecord};

use serde_json::Value;

/// Run the decoder for one specific shape.
pub fn decode(shape: DocumentShape, doc: &Value) -> Result<Vec<SituationRecord>, ShapeMismatch> {
    match shape {
        DocumentShape::SituationMap => situation_map::decode(doc),
        DocumentShape::ValidatedGraph => graph_shapes::decode_validated(doc),
        DocumentShape::NodeGraph => graph_shapes::decode_nested(doc),
        DocumentShape::WorldContext => world::decode(doc),
        DocumentShape::ArcExport => arcs::decode(doc),
    }
}

/// Infer the document's shape and normalize it into situation records.
///
/// Shapes are tried in [`DocumentShape::PRIORITY`] order and the first decoder
/// that accepts the document wins. A document no decoder accepts yields an empty
/// extraction rather than an error.
pub fn extract(doc: &Value) -> Extraction {
    for shape in DocumentShape::PRIORITY {
        match decode(shape, doc) {
            Ok(records) => {
                tracing::debug!(shape = %shape, records = records.len(), "Recognized save shape");
                return Extraction {
                    shape: Some(shape),
                    records,
                };
            }
            Err(mismatch) => {
                tracing::trace!(shape = %shape, reason = %mismatch, "Shape did not match");
            }
        }
    }

    tracing::debug!("Unrecognized save shape, nothing to extract");
    Extraction::empty()
}

/// Like [`extract`], but only considers `shape`. Saves written by the world
/// generator carry both a `world_context` and `arcs`; this picks the arcs.
pub fn extract_as(doc: &Value, shape: DocumentShape) -> Extraction {
    match decode(shape, doc) {
        Ok(records) => Extraction {
            shape: Some(shape),
            records,
        },
        Err(mismatch) => {
            tracing::debug!(shape = %shape, reason = %mismatch, "Requested shape did not match");
            Extraction::empty()
        }
    }
}

pub fn extract_situations(doc: &Value) -> Vec<SituationRecord> {
    extract(doc).records
}
