//! Generic status-transition engine.
//!
//! Every document type defines a static table of allowed status edges.
//! The engine validates a requested transition against that table and,
//! when valid, produces a [`TransitionPlan`] carrying the audit payload
//! the persistence layer appends to the transition log. A transition to
//! the current status is a trivially allowed no-op and produces no plan
//! (and therefore no audit row).

pub mod error;

use chrono::{DateTime, Utc};
use serde_json::Value;

use tradewind_shared::types::ActorId;

pub use error::StateMachineError;

/// A status enum usable with the transition engine.
///
/// Implementors are plain `Copy` enums with a stable wire string.
pub trait State: Copy + Eq + std::fmt::Display + 'static {
    /// Returns the wire/storage representation of the status.
    fn as_str(&self) -> &'static str;
}

/// Static table of allowed status edges for one entity type.
///
/// Statuses missing from the table are terminal (empty outgoing edge set).
#[derive(Debug)]
pub struct StateMachine<S: State> {
    /// Allowed edges: `(from, allowed targets)`.
    pub edges: &'static [(S, &'static [S])],
}

/// Context for a planned transition: who, why, and free-form metadata.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    /// The acting principal, or `None` for system-initiated transitions.
    pub actor: Option<ActorId>,
    /// Optional human-readable notes.
    pub notes: Option<String>,
    /// Optional structured metadata stored alongside the audit row.
    pub metadata: Option<Value>,
}

impl TransitionContext {
    /// Context for a system-initiated transition (no acting principal).
    #[must_use]
    pub fn system() -> Self {
        Self::default()
    }

    /// Context for a transition performed by a principal.
    #[must_use]
    pub fn actor(actor: ActorId) -> Self {
        Self {
            actor: Some(actor),
            ..Self::default()
        }
    }

    /// Attaches notes to the context.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attaches structured metadata to the context.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A validated transition, ready to be persisted with its audit row.
#[derive(Debug, Clone)]
pub struct TransitionPlan<S: State> {
    /// Status before the transition.
    pub from: S,
    /// Status after the transition.
    pub to: S,
    /// The acting principal, or `None` for system transitions.
    pub actor: Option<ActorId>,
    /// Optional notes for the audit row.
    pub notes: Option<String>,
    /// Optional structured metadata for the audit row.
    pub metadata: Option<Value>,
    /// When the transition was planned.
    pub occurred_at: DateTime<Utc>,
}

impl<S: State> StateMachine<S> {
    /// Returns the allowed targets from the given status.
    ///
    /// Statuses without a table entry are terminal.
    #[must_use]
    pub fn allowed_targets(&self, from: S) -> &'static [S] {
        self.edges
            .iter()
            .find(|(s, _)| *s == from)
            .map_or(&[], |(_, targets)| *targets)
    }

    /// Returns true if the status has no outgoing edges.
    #[must_use]
    pub fn is_terminal(&self, status: S) -> bool {
        self.allowed_targets(status).is_empty()
    }

    /// Returns true if the transition is allowed.
    ///
    /// A transition to the current status is trivially allowed.
    #[must_use]
    pub fn can_transition(&self, from: S, to: S) -> bool {
        to == from || self.allowed_targets(from).contains(&to)
    }

    /// Validates a transition and produces its audit payload.
    ///
    /// Returns `Ok(None)` for the idempotent no-op (`to == from`): no
    /// status change, no audit row. Invalid targets yield
    /// [`StateMachineError::InvalidTransition`] naming the current
    /// status, the target, and the allowed set.
    pub fn plan(
        &self,
        from: S,
        to: S,
        ctx: TransitionContext,
    ) -> Result<Option<TransitionPlan<S>>, StateMachineError> {
        if to == from {
            return Ok(None);
        }

        if !self.can_transition(from, to) {
            return Err(StateMachineError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
                allowed: self
                    .allowed_targets(from)
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            });
        }

        Ok(Some(TransitionPlan {
            from,
            to,
            actor: ctx.actor,
            notes: ctx.notes,
            metadata: ctx.metadata,
            occurred_at: Utc::now(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
        Off,
    }

    impl State for Light {
        fn as_str(&self) -> &'static str {
            match self {
                Self::Red => "red",
                Self::Green => "green",
                Self::Off => "off",
            }
        }
    }

    impl std::fmt::Display for Light {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.as_str())
        }
    }

    static LIGHT_MACHINE: StateMachine<Light> = StateMachine {
        edges: &[
            (Light::Red, &[Light::Green, Light::Off]),
            (Light::Green, &[Light::Red]),
        ],
    };

    #[test]
    fn test_allowed_targets() {
        assert_eq!(
            LIGHT_MACHINE.allowed_targets(Light::Red),
            &[Light::Green, Light::Off]
        );
        assert_eq!(LIGHT_MACHINE.allowed_targets(Light::Off), &[] as &[Light]);
    }

    #[test]
    fn test_terminal_status_has_no_edges() {
        assert!(LIGHT_MACHINE.is_terminal(Light::Off));
        assert!(!LIGHT_MACHINE.is_terminal(Light::Red));
    }

    #[test]
    fn test_can_transition() {
        assert!(LIGHT_MACHINE.can_transition(Light::Red, Light::Green));
        assert!(!LIGHT_MACHINE.can_transition(Light::Green, Light::Off));
        assert!(!LIGHT_MACHINE.can_transition(Light::Off, Light::Red));
    }

    #[test]
    fn test_no_op_is_always_allowed() {
        assert!(LIGHT_MACHINE.can_transition(Light::Off, Light::Off));
        assert!(LIGHT_MACHINE.can_transition(Light::Red, Light::Red));
    }

    #[test]
    fn test_plan_no_op_produces_no_audit_row() {
        let plan = LIGHT_MACHINE
            .plan(Light::Red, Light::Red, TransitionContext::system())
            .unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn test_plan_valid_transition() {
        let actor = ActorId::new();
        let ctx = TransitionContext::actor(actor)
            .with_notes("manual switch")
            .with_metadata(json!({"shift": "night"}));

        let plan = LIGHT_MACHINE.plan(Light::Red, Light::Green, ctx).unwrap();
        let plan = plan.expect("transition should produce a plan");
        assert_eq!(plan.from, Light::Red);
        assert_eq!(plan.to, Light::Green);
        assert_eq!(plan.actor, Some(actor));
        assert_eq!(plan.notes.as_deref(), Some("manual switch"));
        assert_eq!(plan.metadata, Some(json!({"shift": "night"})));
    }

    #[test]
    fn test_plan_invalid_transition_names_allowed_set() {
        let err = LIGHT_MACHINE
            .plan(Light::Green, Light::Off, TransitionContext::system())
            .unwrap_err();

        match err {
            StateMachineError::InvalidTransition { from, to, allowed } => {
                assert_eq!(from, "green");
                assert_eq!(to, "off");
                assert_eq!(allowed, vec!["red".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_from_terminal_status_fails() {
        let err = LIGHT_MACHINE
            .plan(Light::Off, Light::Red, TransitionContext::system())
            .unwrap_err();
        assert!(matches!(
            err,
            StateMachineError::InvalidTransition { .. }
        ));
    }
}
