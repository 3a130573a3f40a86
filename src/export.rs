//! Export types for serializing a classification.
//!
//! These types provide human-readable, label-resolved representations of
//! the taxonomy and of individual types, suitable for JSON export.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::label::LabelIndex;
use crate::reasoner::Classification;

/// One equivalence class of named classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNodeExport {
    /// Member IRIs, sorted.
    pub members: Vec<String>,
    /// Labels of all members, sorted.
    pub labels: Vec<String>,
    /// Representative IRI of each direct parent node.
    pub parents: Vec<String>,
}

/// An individual with its direct types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualExport {
    pub iri: String,
    /// Most specific named classes.
    pub types: Vec<String>,
}

/// A whole classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationExport {
    /// Taxonomy nodes, top first, then by representative IRI.
    pub nodes: Vec<ClassNodeExport>,
    /// Unsatisfiable classes.
    pub unsatisfiable: Vec<String>,
    pub individuals: Vec<IndividualExport>,
}

impl ClassificationExport {
    pub fn new(classification: &Classification, labels: &LabelIndex) -> Self {
        let representative = |node| {
            classification
                .members(node)
                .iter()
                .next()
                .map(|iri| iri.as_str().to_string())
                .unwrap_or_default()
        };

        let mut nodes: Vec<ClassNodeExport> = classification
            .nodes()
            .map(|node| {
                let members = classification.members(node);
                let mut labels: Vec<String> = members
                    .iter()
                    .flat_map(|iri| labels.labels_of(iri))
                    .map(str::to_string)
                    .collect();
                labels.sort();
                labels.dedup();
                let mut parents: Vec<String> = classification
                    .direct_parents(node)
                    .map(representative)
                    .collect();
                parents.sort();
                ClassNodeExport {
                    members: members.iter().map(|iri| iri.as_str().to_string()).collect(),
                    labels,
                    parents,
                }
            })
            .collect();
        nodes.sort_by(|a, b| {
            a.parents
                .is_empty()
                .cmp(&b.parents.is_empty())
                .reverse()
                .then_with(|| a.members.cmp(&b.members))
        });

        let individuals = classification
            .individuals()
            .map(|(iri, types)| IndividualExport {
                iri: iri.as_str().to_string(),
                types: types
                    .direct
                    .iter()
                    .map(|class| class.as_str().to_string())
                    .collect(),
            })
            .collect::<Vec<_>>();

        Self {
            nodes,
            unsatisfiable: classification
                .unsatisfiable()
                .iter()
                .map(|iri| iri.as_str().to_string())
                .collect(),
            individuals,
        }
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string_pretty(self).map_err(|e| CodecError::Serialize {
            message: e.to_string(),
        })
    }

    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        serde_json::from_str(text).map_err(|e| CodecError::Parse {
            message: e.to_string(),
        })
    }
}
