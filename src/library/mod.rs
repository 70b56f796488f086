//! Core library - discovers core manifests and orders dependency graphs.
//!
//! The library is the [`DependencySource`] used by the command-line
//! front end. It walks one or more directories for `*.core.toml` files,
//! resolves a system core and everything it transitively depends on, and
//! hands the build engine the cores with dependencies first.

pub mod errors;

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::Result;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use walkdir::WalkDir;

use crate::core::{Core, CoreName, Flags, ManifestCore, MANIFEST_SUFFIX};
use crate::sources::FetchOptions;

pub use errors::LibraryError;

/// Supplies the ordered set of cores a system is built from.
pub trait DependencySource {
    /// Cores needed to build `system`, dependencies before dependents.
    ///
    /// The system core itself is the last element.
    fn get_depends(&mut self, system: &CoreName, flags: &Flags) -> Result<Vec<Box<dyn Core>>>;
}

/// A collection of manifest-backed cores.
#[derive(Debug, Default)]
pub struct CoreLibrary {
    cores: Vec<ManifestCore>,
}

impl CoreLibrary {
    pub fn new() -> Self {
        CoreLibrary::default()
    }

    /// Load every manifest found under `roots`.
    ///
    /// Roots are walked in order and files within a root in name order, so a
    /// core found later replaces an earlier one with the same name. Manifests
    /// that fail to load are reported and skipped.
    pub fn discover(roots: &[PathBuf], cache_dir: &Path, fetch_opts: &FetchOptions) -> Self {
        let mut library = CoreLibrary::new();

        for root in roots {
            if !root.exists() {
                tracing::warn!("cores root {} does not exist", root.display());
                continue;
            }

            let walker = WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file());

            for entry in walker {
                let is_manifest = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|n| n.ends_with(MANIFEST_SUFFIX));
                if !is_manifest {
                    continue;
                }

                match ManifestCore::load(entry.path()) {
                    Ok(core) => library.add(core.with_cache(cache_dir, fetch_opts.clone())),
                    Err(e) => tracing::warn!("skipping {}: {}", entry.path().display(), e),
                }
            }
        }

        tracing::debug!("found {} cores", library.cores.len());
        library
    }

    /// Add a core, replacing any core with the same name.
    pub fn add(&mut self, core: ManifestCore) {
        if let Some(existing) = self.cores.iter_mut().find(|c| c.name() == core.name()) {
            tracing::debug!(
                "{} from {} replaces {}",
                core.name(),
                core.manifest_path().display(),
                existing.manifest_path().display()
            );
            *existing = core;
        } else {
            self.cores.push(core);
        }
    }

    pub fn cores(&self) -> &[ManifestCore] {
        &self.cores
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// The highest version of a core satisfying `dep`.
    ///
    /// A bare name (no vendor or library) matches on the name alone.
    pub fn find(&self, dep: &CoreName) -> Option<&ManifestCore> {
        self.find_index(dep).map(|idx| &self.cores[idx])
    }

    /// Like [`find`](Self::find), but fails with a helpful error.
    pub fn resolve(&self, dep: &CoreName) -> Result<&ManifestCore, LibraryError> {
        self.resolve_index(dep, None).map(|idx| &self.cores[idx])
    }

    fn find_index(&self, dep: &CoreName) -> Option<usize> {
        let bare = dep.vendor().is_empty() && dep.library().is_empty();

        self.cores
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.name().satisfies(dep)
                    || (bare
                        && c.name().name() == dep.name()
                        && (dep.version().is_empty() || c.name().version() == dep.version()))
            })
            .max_by(|(_, a), (_, b)| a.name().cmp_version(b.name()))
            .map(|(idx, _)| idx)
    }

    fn resolve_index(
        &self,
        dep: &CoreName,
        required_by: Option<&CoreName>,
    ) -> Result<usize, LibraryError> {
        self.find_index(dep).ok_or_else(|| {
            let known: Vec<String> = self.cores.iter().map(|c| c.name().to_string()).collect();
            LibraryError::not_found(
                &dep.to_string(),
                required_by.map(|r| r.to_string()),
                known.iter().map(String::as_str),
            )
        })
    }

    /// Indices of the cores `system` needs, dependencies first.
    fn dependency_order(&self, system: &CoreName, flags: &Flags) -> Result<Vec<usize>, LibraryError> {
        let root = self.resolve_index(system, None)?;

        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let mut nodes: HashMap<usize, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::new();

        nodes.insert(root, graph.add_node(root));
        queue.push_back(root);

        while let Some(idx) = queue.pop_front() {
            let core = &self.cores[idx];
            let core_flags = flags.toplevel(idx == root);

            for dep in core.depends(&core_flags) {
                let dep_idx = self.resolve_index(&dep, Some(core.name()))?;
                let dep_node = *nodes.entry(dep_idx).or_insert_with(|| {
                    queue.push_back(dep_idx);
                    graph.add_node(dep_idx)
                });

                let from = nodes[&idx];
                if !graph.contains_edge(from, dep_node) {
                    graph.add_edge(from, dep_node, ());
                }
            }
        }

        match toposort(&graph, None) {
            // Edges point from dependent to dependency, so reverse to get
            // dependencies first.
            Ok(order) => Ok(order.into_iter().rev().map(|n| graph[n]).collect()),
            Err(cycle) => {
                let start = cycle.node_id();
                let component = tarjan_scc(&graph)
                    .into_iter()
                    .find(|scc| scc.contains(&start))
                    .unwrap_or_else(|| vec![start]);

                let mut cores: Vec<String> = component
                    .iter()
                    .map(|n| self.cores[graph[*n]].name().to_string())
                    .collect();
                cores.sort();
                if let Some(first) = cores.first().cloned() {
                    cores.push(first);
                }
                Err(LibraryError::Cycle { cores })
            }
        }
    }
}

impl DependencySource for CoreLibrary {
    fn get_depends(&mut self, system: &CoreName, flags: &Flags) -> Result<Vec<Box<dyn Core>>> {
        let order = self.dependency_order(system, flags)?;

        tracing::debug!(
            "dependency order for {}: {}",
            system,
            order
                .iter()
                .map(|idx| self.cores[*idx].name().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(order
            .into_iter()
            .map(|idx| Box::new(self.cores[idx].clone()) as Box<dyn Core>)
            .collect())
    }
}
