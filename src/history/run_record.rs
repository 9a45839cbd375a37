//! Run Record - one CI invocation's measurements tied to one commit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Measurement;
use crate::{Error, Result};

/// Git identity of a commit author or committer. Opaque to the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    /// Display name
    pub name: String,
    /// E-mail address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Forge username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Person {
    /// Create a person with just a display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            username: None,
        }
    }
}

/// Commit metadata attached to a run.
///
/// Only `id` is interpreted (it is the identity key of a run); every other
/// field is carried through to the persisted snapshot untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitInfo {
    id: String,
    #[serde(default)]
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tree_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distinct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    committer: Option<Person>,
}

impl CommitInfo {
    /// Create commit metadata carrying only the commit id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the commit message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the ISO-8601 commit timestamp as reported by git.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Set the web URL of the commit.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the git tree id.
    #[must_use]
    pub fn with_tree_id(mut self, tree_id: impl Into<String>) -> Self {
        self.tree_id = Some(tree_id.into());
        self
    }

    /// Set the push-event `distinct` flag.
    #[must_use]
    pub const fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = Some(distinct);
        self
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(mut self, author: Person) -> Self {
        self.author = Some(author);
        self
    }

    /// Set the committer.
    #[must_use]
    pub fn with_committer(mut self, committer: Person) -> Self {
        self.committer = Some(committer);
        self
    }

    /// Get the commit id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the commit message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the commit URL, if known.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Get the tree id, if known.
    #[must_use]
    pub fn tree_id(&self) -> Option<&str> {
        self.tree_id.as_deref()
    }

    /// Get the author, if known.
    #[must_use]
    pub const fn author(&self) -> Option<&Person> {
        self.author.as_ref()
    }

    /// Get the committer, if known.
    #[must_use]
    pub const fn committer(&self) -> Option<&Person> {
        self.committer.as_ref()
    }
}

/// Run Record holds every measurement produced by one CI invocation.
///
/// The commit id is the sole identity of a run: two records with the same
/// commit id are the same run, whatever their dates or measurements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    commit: CommitInfo,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    date: DateTime<Utc>,
    tool: String,
    benches: Vec<Measurement>,
}

impl RunRecord {
    /// Create a run record dated now.
    ///
    /// # Arguments
    ///
    /// * `commit_id` - Revision the benchmarks ran against
    /// * `tool` - Benchmarking tool that produced the measurements
    /// * `benches` - Measurements, names unique within the run
    #[must_use]
    pub fn new(
        commit_id: impl Into<String>,
        tool: impl Into<String>,
        benches: Vec<Measurement>,
    ) -> Self {
        Self {
            commit: CommitInfo::new(commit_id),
            date: Utc::now(),
            tool: tool.into(),
            benches,
        }
    }

    /// Create a builder for constructing a run record with optional fields.
    #[must_use]
    pub fn builder(commit_id: impl Into<String>, tool: impl Into<String>) -> RunRecordBuilder {
        RunRecordBuilder::new(commit_id, tool)
    }

    /// Get the commit id (identity key).
    #[must_use]
    pub fn commit_id(&self) -> &str {
        self.commit.id()
    }

    /// Get the full commit metadata.
    #[must_use]
    pub const fn commit(&self) -> &CommitInfo {
        &self.commit
    }

    /// Get the instant the record was produced.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Get the benchmarking tool name.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Get the measurements in recorded order.
    #[must_use]
    pub fn benches(&self) -> &[Measurement] {
        &self.benches
    }

    /// Find a measurement by name.
    #[must_use]
    pub fn bench(&self, name: &str) -> Option<&Measurement> {
        self.benches.iter().find(|m| m.name() == name)
    }

    /// Check the record on its own, without any history.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the commit id is blank, there are no
    /// measurements, a measurement is invalid, or a name repeats.
    pub fn validate(&self) -> Result<()> {
        if self.commit_id().trim().is_empty() {
            return Err(Error::Validation("commit id is empty".to_string()));
        }
        if self.benches.is_empty() {
            return Err(Error::Validation(format!(
                "run for commit '{}' has no measurements",
                self.commit_id()
            )));
        }

        let mut seen = rustc_hash::FxHashSet::default();
        for bench in &self.benches {
            bench.validate()?;
            if !seen.insert(bench.name()) {
                return Err(Error::Validation(format!(
                    "measurement '{}' appears more than once in run for commit '{}'",
                    bench.name(),
                    self.commit_id()
                )));
            }
        }
        Ok(())
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
pub struct RunRecordBuilder {
    commit: CommitInfo,
    date: DateTime<Utc>,
    tool: String,
    benches: Vec<Measurement>,
}

impl RunRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(commit_id: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            commit: CommitInfo::new(commit_id),
            date: Utc::now(),
            tool: tool.into(),
            benches: Vec::new(),
        }
    }

    /// Replace the commit metadata. The commit id comes from `commit`.
    #[must_use]
    pub fn commit(mut self, commit: CommitInfo) -> Self {
        self.commit = commit;
        self
    }

    /// Set a custom record date.
    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Append one measurement.
    #[must_use]
    pub fn bench(mut self, bench: Measurement) -> Self {
        self.benches.push(bench);
        self
    }

    /// Append several measurements.
    #[must_use]
    pub fn benches(mut self, benches: impl IntoIterator<Item = Measurement>) -> Self {
        self.benches.extend(benches);
        self
    }

    /// Build the `RunRecord`.
    #[must_use]
    pub fn build(self) -> RunRecord {
        RunRecord {
            commit: self.commit,
            date: self.date,
            tool: self.tool,
            benches: self.benches,
        }
    }
}
