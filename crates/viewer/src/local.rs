use anyhow::{Context, Result};
use graph::{GraphPresenter, PresenterOptions, graph_stats};
use store::SaveStore;

use crate::client::{GraphPayload, GraphRequest};

/// Build the same payload `/api/graph/{path}` serves, straight from a saves directory.
pub fn build_payload(store: &SaveStore, path: &str, request: GraphRequest) -> Result<GraphPayload> {
    let doc = store
        .read_document(path)
        .with_context(|| format!("Failed to load {} from {}", path, store.root().display()))?;

    let extraction = match request.shape {
        Some(shape) => extract::extract_as(&doc, shape),
        None => extract::extract(&doc),
    };

    let defaults = PresenterOptions::default();
    let options = PresenterOptions {
        labels: request.labels.unwrap_or(defaults.labels),
        missing_targets: request.missing.unwrap_or(defaults.missing_targets),
    };
    let graph = GraphPresenter::new(options).present(&extraction);
    let stats = graph_stats(&graph);

    tracing::debug!(
        path = %path,
        shape = ?extraction.shape,
        nodes = stats.nodes,
        "Built graph locally"
    );

    Ok(GraphPayload {
        path: path.to_string(),
        shape: extraction.shape,
        graph,
        stats,
    })
}
