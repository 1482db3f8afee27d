use super::WorkflowDocument;
use crate::core::config::RewireConfig;
use crate::core::error::AppError;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// A deprecated node and the node that should take over its incoming edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub deprecated: String,
    pub replacement: String,
}

impl RewriteRule {
    pub fn new<D: Into<String>, R: Into<String>>(deprecated: D, replacement: R) -> Self {
        RewriteRule {
            deprecated: deprecated.into(),
            replacement: replacement.into(),
        }
    }
}

/// The full rule set applied by [`rewrite_connections`].
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRules {
    rules: IndexMap<String, String>,
    branch_index: usize,
    source_prefix: Option<String>,
}

impl RewriteRules {
    pub fn new<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = RewriteRule>,
    {
        RewriteRules {
            rules: rules
                .into_iter()
                .map(|rule| (rule.deprecated, rule.replacement))
                .collect(),
            branch_index: 1,
            source_prefix: None,
        }
    }

    pub fn from_config(config: &RewireConfig) -> Self {
        Self::new(config.rules.iter().cloned())
            .with_branch_index(config.branch_index)
            .with_source_prefix(config.source_prefix.clone())
    }

    pub fn with_branch_index(mut self, branch_index: usize) -> Self {
        self.branch_index = branch_index;
        self
    }

    pub fn with_source_prefix(mut self, source_prefix: Option<String>) -> Self {
        self.source_prefix = source_prefix;
        self
    }

    pub fn deprecated_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn replacement_for(&self, deprecated: &str) -> Option<&str> {
        self.rules.get(deprecated).map(String::as_str)
    }

    pub fn is_deprecated(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn branch_index(&self) -> usize {
        self.branch_index
    }

    fn inspects(&self, source: &str) -> bool {
        self.source_prefix
            .as_deref()
            .map_or(true, |prefix| source.starts_with(prefix))
    }
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self::from_config(&RewireConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub source: String,
    pub from: String,
    pub to: String,
}

/// A link that still targets a node whose connection entry was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingLink {
    pub source: String,
    pub branch: usize,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RewriteReport {
    /// Deprecated node -> the node it pointed to before removal.
    pub downstream: IndexMap<String, String>,
    pub redirected: Vec<Redirect>,
    pub removed: Vec<String>,
    pub dangling: Vec<DanglingLink>,
}

impl RewriteReport {
    pub fn is_noop(&self) -> bool {
        self.redirected.is_empty() && self.removed.is_empty()
    }
}

/// Redirect links that go through deprecated nodes and drop the deprecated entries.
///
/// A link is only redirected when the deprecated node it targets had a recorded
/// downstream target; otherwise it is left as-is and shows up in
/// [`RewriteReport::dangling`].
pub fn rewrite_connections(doc: &mut WorkflowDocument, rules: &RewriteRules) -> RewriteReport {
    let mut report = RewriteReport::default();
    let Some(connections) = doc.connections_mut() else {
        debug!("workflow has no connections member");
        return report;
    };

    for name in rules.deprecated_names() {
        if let Some(target) = connections.get(name).and_then(|entry| entry.first_target()) {
            info!(deprecated = name, downstream = target, "found downstream target");
            report.downstream.insert(name.to_string(), target.to_string());
        }
    }

    let branch_index = rules.branch_index();
    for (source, entry) in connections.iter_mut() {
        if rules.is_deprecated(source) || !rules.inspects(source) {
            continue;
        }
        let Some(branch) = entry.branch_mut(branch_index) else {
            continue;
        };
        for link in branch.iter_mut() {
            let Some(deprecated) = link.node().map(str::to_string) else {
                continue;
            };
            let Some(replacement) = rules.replacement_for(&deprecated) else {
                continue;
            };
            let Some(recorded) = report.downstream.get(&deprecated) else {
                continue;
            };
            if recorded != replacement {
                warn!(
                    source = source.as_str(),
                    deprecated = deprecated.as_str(),
                    recorded = recorded.as_str(),
                    replacement,
                    "deprecated node pointed somewhere other than its replacement"
                );
            }
            link.retarget(replacement);
            info!(source = source.as_str(), to = replacement, "redirected link");
            report.redirected.push(Redirect {
                source: source.clone(),
                from: deprecated,
                to: replacement.to_string(),
            });
        }
    }

    for name in rules.deprecated_names() {
        if connections.shift_remove(name).is_some() {
            info!(deprecated = name, "removed connection entry");
            report.removed.push(name.to_string());
        }
    }

    let removed: IndexSet<&str> = report.removed.iter().map(String::as_str).collect();
    for (source, entry) in connections.iter() {
        for (branch, link) in entry.links() {
            let Some(target) = link.node() else {
                continue;
            };
            if removed.contains(target) {
                warn!(
                    source = source.as_str(),
                    branch,
                    to = target,
                    "link left pointing at a removed node"
                );
                report.dangling.push(DanglingLink {
                    source: source.clone(),
                    branch,
                    target: target.to_string(),
                });
            }
        }
    }

    report
}

/// Load `input`, rewrite it, and write the result to `output` unless `dry_run` is set.
///
/// `input` and `output` may be the same path, in which case the file is overwritten.
#[allow(clippy::result_large_err)]
pub fn rewire_file(
    input: &Path,
    output: &Path,
    rules: &RewriteRules,
    dry_run: bool,
) -> Result<RewriteReport, AppError> {
    info!(path = %input.display(), "reading workflow");
    let mut doc = WorkflowDocument::load(input)?;
    let report = rewrite_connections(&mut doc, rules);

    if dry_run {
        info!("dry run, not writing {}", output.display());
    } else {
        info!(path = %output.display(), "writing workflow");
        doc.save(output)?;
    }

    Ok(report)
}
