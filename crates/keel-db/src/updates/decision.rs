//! Decision update builder.

use std::collections::BTreeSet;

use keel_core::enums::DecisionStatus;
use serde::Serialize;

/// A partial update to a decision record. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecisionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consequences: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DecisionStatus>,
}

impl DecisionUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.context.is_none()
            && self.decision.is_none()
            && self.rationale.is_none()
            && self.consequences.is_none()
            && self.tags.is_none()
            && self.status.is_none()
    }

    /// Whether the update writes a field that is frozen once superseded.
    #[must_use]
    pub const fn touches_content(&self) -> bool {
        self.context.is_some()
            || self.decision.is_some()
            || self.rationale.is_some()
            || self.consequences.is_some()
    }

    /// Provided text fields paired with their column names.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("context", &self.context),
            ("decision", &self.decision),
            ("rationale", &self.rationale),
            ("consequences", &self.consequences),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

#[derive(Debug, Default)]
pub struct DecisionUpdateBuilder(DecisionUpdate);

impl DecisionUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(DecisionUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.0.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn decision(mut self, decision: impl Into<String>) -> Self {
        self.0.decision = Some(decision.into());
        self
    }

    #[must_use]
    pub fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.0.rationale = Some(rationale.into());
        self
    }

    #[must_use]
    pub fn consequences(mut self, consequences: impl Into<String>) -> Self {
        self.0.consequences = Some(consequences.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: BTreeSet<String>) -> Self {
        self.0.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn status(mut self, status: DecisionStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> DecisionUpdate {
        self.0
    }
}
