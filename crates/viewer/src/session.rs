use anyhow::Result;
use store::SaveEntry;

use crate::client::GraphPayload;

/// Issued by [`ViewerSession::select_folder`]; only the newest one may fill the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilesTicket(u64);

/// Issued by [`ViewerSession::select_file`]; only the newest one may fill the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphStatus {
    /// No file selected.
    Idle,
    Loading,
    Ready,
    /// The fetch failed or the save held no recognizable situations.
    NoData,
}

/// Selection state of the viewer: folder, file and the graph for that file.
///
/// Every selection bumps a generation counter and hands out a ticket. Responses
/// carrying an outdated ticket are dropped, so a slow reply for a previous
/// selection never overwrites the current one.
#[derive(Debug)]
pub struct ViewerSession {
    folders: Vec<SaveEntry>,
    files: Vec<SaveEntry>,
    selected_folder: Option<String>,
    selected_file: Option<String>,
    graph: Option<GraphPayload>,
    status: GraphStatus,
    last_error: Option<String>,
    files_generation: u64,
    graph_generation: u64,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerSession {
    pub fn new() -> Self {
        Self {
            folders: Vec::new(),
            files: Vec::new(),
            selected_folder: None,
            selected_file: None,
            graph: None,
            status: GraphStatus::Idle,
            last_error: None,
            files_generation: 0,
            graph_generation: 0,
        }
    }

    pub fn folders(&self) -> &[SaveEntry] {
        &self.folders
    }

    pub fn files(&self) -> &[SaveEntry] {
        &self.files
    }

    pub fn selected_folder(&self) -> Option<&str> {
        self.selected_folder.as_deref()
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    pub fn graph(&self) -> Option<&GraphPayload> {
        self.graph.as_ref()
    }

    pub fn status(&self) -> GraphStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_folders(&mut self, result: Result<Vec<SaveEntry>>) {
        match result {
            Ok(folders) => self.folders = folders,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load folders");
                self.last_error = Some(e.to_string());
                self.folders.clear();
            }
        }
    }

    /// Switch folders. The file list, the selected file and the graph are cleared
    /// right away and any in-flight file or graph response becomes stale.
    pub fn select_folder(&mut self, folder: impl Into<String>) -> FilesTicket {
        self.selected_folder = Some(folder.into());
        self.files.clear();
        self.clear_file();
        self.files_generation += 1;
        FilesTicket(self.files_generation)
    }

    /// Returns false when the ticket is stale and the response was dropped.
    pub fn apply_files(&mut self, ticket: FilesTicket, result: Result<Vec<SaveEntry>>) -> bool {
        if ticket.0 != self.files_generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.files_generation,
                "Dropping stale file list"
            );
            return false;
        }
        match result {
            Ok(files) => self.files = files,
            Err(e) => {
                tracing::warn!(
                    folder = ?self.selected_folder,
                    error = %e,
                    "Failed to load files"
                );
                self.last_error = Some(e.to_string());
                self.files.clear();
            }
        }
        true
    }

    /// Select a file; the previous graph is dropped until the new one arrives.
    pub fn select_file(&mut self, path: impl Into<String>) -> GraphTicket {
        self.selected_file = Some(path.into());
        self.graph = None;
        self.status = GraphStatus::Loading;
        self.graph_generation += 1;
        GraphTicket(self.graph_generation)
    }

    /// Returns false when the ticket is stale and the response was dropped.
    /// Failures are logged and leave the session in the no-data state.
    pub fn apply_graph(&mut self, ticket: GraphTicket, result: Result<GraphPayload>) -> bool {
        if ticket.0 != self.graph_generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.graph_generation,
                "Dropping stale graph"
            );
            return false;
        }
        match result {
            Ok(payload) => {
                self.status = if payload.graph.is_empty() {
                    GraphStatus::NoData
                } else {
                    GraphStatus::Ready
                };
                self.last_error = None;
                self.graph = Some(payload);
            }
            Err(e) => {
                tracing::error!(
                    file = ?self.selected_file,
                    error = %e,
                    "Failed to load situation graph"
                );
                self.last_error = Some(e.to_string());
                self.graph = None;
                self.status = GraphStatus::NoData;
            }
        }
        true
    }

    fn clear_file(&mut self) {
        self.selected_file = None;
        self.graph = None;
        self.status = GraphStatus::Idle;
        self.graph_generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::{GraphNode, GraphStats, GraphView};

    fn payload(path: &str, ids: &[&str]) -> GraphPayload {
        GraphPayload {
            path: path.to_string(),
            shape: None,
            graph: GraphView {
                nodes: ids.iter().map(|id| GraphNode::situation(*id, *id)).collect(),
                edges: Vec::new(),
            },
            stats: GraphStats::default(),
        }
    }

    fn entries(names: &[&str]) -> Vec<SaveEntry> {
        names.iter().map(|n| SaveEntry::new(*n, *n)).collect()
    }

    #[test]
    fn test_folder_change_resets_file_and_graph() {
        let mut session = ViewerSession::new();
        let files = session.select_folder("run_01");
        assert!(session.apply_files(files, Ok(entries(&["a.json"]))));
        let graph = session.select_file("run_01/a.json");
        assert!(session.apply_graph(graph, Ok(payload("run_01/a.json", &["s1"]))));
        assert_eq!(session.status(), GraphStatus::Ready);

        session.select_folder("run_02");
        assert_eq!(session.selected_folder(), Some("run_02"));
        assert!(session.files().is_empty());
        assert!(session.selected_file().is_none());
        assert!(session.graph().is_none());
        assert_eq!(session.status(), GraphStatus::Idle);
    }

    #[test]
    fn test_stale_file_list_is_dropped() {
        let mut session = ViewerSession::new();
        let first = session.select_folder("run_01");
        let second = session.select_folder("run_02");

        assert!(session.apply_files(second, Ok(entries(&["b.json"]))));
        assert!(!session.apply_files(first, Ok(entries(&["a.json"]))));
        assert_eq!(session.files(), entries(&["b.json"]).as_slice());
    }

    #[test]
    fn test_stale_graph_is_dropped() {
        let mut session = ViewerSession::new();
        let first = session.select_file("a.json");
        let second = session.select_file("b.json");

        assert!(session.apply_graph(second, Ok(payload("b.json", &["s2"]))));
        assert!(!session.apply_graph(first, Ok(payload("a.json", &["s1"]))));
        assert_eq!(session.graph().map(|g| g.path.as_str()), Some("b.json"));
    }

    #[test]
    fn test_graph_in_flight_is_stale_after_folder_change() {
        let mut session = ViewerSession::new();
        session.select_folder("run_01");
        let graph = session.select_file("run_01/a.json");
        session.select_folder("run_02");

        assert!(!session.apply_graph(graph, Ok(payload("run_01/a.json", &["s1"]))));
        assert!(session.graph().is_none());
    }

    #[test]
    fn test_failure_falls_back_to_no_data() {
        let mut session = ViewerSession::new();
        let graph = session.select_file("broken.json");
        assert!(session.apply_graph(graph, Err(anyhow::anyhow!("500: Failed to read file"))));

        assert_eq!(session.status(), GraphStatus::NoData);
        assert!(session.graph().is_none());
        assert!(session.last_error().unwrap().contains("Failed to read file"));
    }

    #[test]
    fn test_folder_list_failure_is_empty() {
        let mut session = ViewerSession::new();
        session.set_folders(Ok(entries(&["run_01", "run_02"])));
        assert_eq!(session.folders().len(), 2);

        session.set_folders(Err(anyhow::anyhow!("connection refused")));
        assert!(session.folders().is_empty());
        assert_eq!(session.last_error(), Some("connection refused"));
    }

    #[test]
    fn test_empty_graph_is_no_data() {
        let mut session = ViewerSession::new();
        let graph = session.select_file("notes.json");
        session.apply_graph(graph, Ok(payload("notes.json", &[])));
        assert_eq!(session.status(), GraphStatus::NoData);
        assert!(session.graph().is_some());
    }
}
