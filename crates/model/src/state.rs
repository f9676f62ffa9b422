//! Lifecycle states, controller actions and the transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::target::{CurrentState, TargetState};

/// Lifecycle state of a managed instance.
///
/// The stable states are `Undefined`, `Initial`, `Inactive`, `Active` and
/// `Failure`; the remaining states are transient and only visible while an
/// action is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Undefined,
    Initial,
    Inactive,
    Active,
    Failure,
    Creating,
    Starting,
    Stopping,
    Configuring,
    Destroying,
    Resetting,
}

impl State {
    /// Check whether the state is stable (not tied to an in-flight action).
    pub fn is_stable(self) -> bool {
        matches!(
            self,
            Self::Undefined | Self::Initial | Self::Inactive | Self::Active | Self::Failure
        )
    }

    /// Check whether the state is transient.
    pub fn is_transient(self) -> bool {
        !self.is_stable()
    }

    /// Check whether the state may be requested as a target state.
    ///
    /// Operators can only ask for `Initial`, `Inactive` or `Active`; the
    /// remaining states are reached by the dispatcher, never requested.
    pub fn is_requestable(self) -> bool {
        matches!(self, Self::Initial | Self::Inactive | Self::Active)
    }

    /// Canonical lowercase name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Initial => "initial",
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Failure => "failure",
            Self::Creating => "creating",
            Self::Starting => "starting",
            Self::Stopping => "stopping",
            Self::Configuring => "configuring",
            Self::Destroying => "destroying",
            Self::Resetting => "resetting",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "undefined" => Ok(Self::Undefined),
            "initial" => Ok(Self::Initial),
            "inactive" => Ok(Self::Inactive),
            "active" => Ok(Self::Active),
            "failure" => Ok(Self::Failure),
            "creating" => Ok(Self::Creating),
            "starting" => Ok(Self::Starting),
            "stopping" => Ok(Self::Stopping),
            "configuring" => Ok(Self::Configuring),
            "destroying" => Ok(Self::Destroying),
            "resetting" => Ok(Self::Resetting),
            other => Err(Error::UnknownState {
                value: other.into(),
            }),
        }
    }
}

/// The closed set of controller actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Destroy,
    Start,
    Stop,
    Configure,
    Reconfigure,
    Reset,
    Status,
}

impl Action {
    /// The transient state an instance passes through while the action runs.
    ///
    /// `Status` is read-only and has no transient state; it maps to the
    /// identity and callers must not commit a transient hop for it.
    pub fn transient(self) -> Option<State> {
        match self {
            Self::Create => Some(State::Creating),
            Self::Destroy => Some(State::Destroying),
            Self::Start => Some(State::Starting),
            Self::Stop => Some(State::Stopping),
            Self::Configure | Self::Reconfigure => Some(State::Configuring),
            Self::Reset => Some(State::Resetting),
            Self::Status => None,
        }
    }

    /// The stable state a successful action settles in.
    ///
    /// `from` is the stable state the action started from; only `Status`
    /// depends on it (it never advances the state).
    pub fn success_state(self, from: State) -> State {
        match self {
            Self::Create => State::Inactive,
            Self::Destroy => State::Undefined,
            Self::Start => State::Active,
            Self::Stop => State::Inactive,
            Self::Configure => State::Inactive,
            Self::Reconfigure => State::Active,
            Self::Reset => State::Initial,
            Self::Status => from,
        }
    }

    /// Canonical lowercase name of the action, as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Destroy => "destroy",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Configure => "configure",
            Self::Reconfigure => "reconfigure",
            Self::Reset => "reset",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determine the action required to move one hop from `current` toward
/// `target`.
///
/// Returns `Ok(None)` when no action is needed. The hop is always the
/// immediate next transition; callers re-evaluate after committing it, so
/// intermediate stable states are never skipped.
pub fn transition(current: State, target: State) -> Result<Option<Action>> {
    if !target.is_requestable() {
        return Err(Error::InvalidTarget { state: target });
    }

    match (current, target) {
        (State::Undefined, State::Initial) => Ok(None),
        (State::Undefined, State::Inactive | State::Active) => Ok(Some(Action::Create)),

        (State::Initial, State::Initial) => Ok(None),
        (State::Initial, State::Inactive | State::Active) => Ok(Some(Action::Create)),

        (State::Inactive, State::Initial) => Ok(Some(Action::Destroy)),
        (State::Inactive, State::Inactive) => Ok(None),
        (State::Inactive, State::Active) => Ok(Some(Action::Start)),

        (State::Active, State::Initial | State::Inactive) => Ok(Some(Action::Stop)),
        (State::Active, State::Active) => Ok(None),

        (State::Failure, _) => Ok(Some(Action::Reset)),

        (from, to) => Err(Error::NoTransition { from, to }),
    }
}

/// Plan the next action required to close the drift between a current and a
/// target state, including configuration drift.
///
/// Differing configuration at `Inactive` plans a `Configure`, at `Active` a
/// `Reconfigure`; configuration drift in any other state is resolved by the
/// state transition itself.
pub fn plan(current: &CurrentState, target: &TargetState) -> Result<Option<Action>> {
    if current.state == target.state {
        if current.configuration != target.configuration {
            match current.state {
                State::Inactive => return Ok(Some(Action::Configure)),
                State::Active => return Ok(Some(Action::Reconfigure)),
                _ => {}
            }
        }
        return Ok(None);
    }

    transition(current.state, target.state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::target::InstancePath;

    fn states(target: State, current: State, configuration: &str) -> (CurrentState, TargetState) {
        let path = InstancePath::new("d", "s", "v1", "e", "c", "i");
        let target = TargetState {
            path: path.clone(),
            component: "dummy".into(),
            state: target,
            configuration: configuration.into(),
        };
        let current = CurrentState {
            path,
            component: "dummy".into(),
            state: current,
            configuration: String::new(),
            endpoint: String::new(),
        };
        (current, target)
    }

    #[test]
    fn should_create_from_initial_toward_active() {
        assert_eq!(
            transition(State::Initial, State::Active).unwrap(),
            Some(Action::Create)
        );
    }

    #[test]
    fn should_start_from_inactive_toward_active() {
        assert_eq!(
            transition(State::Inactive, State::Active).unwrap(),
            Some(Action::Start)
        );
    }

    #[test]
    fn should_stop_from_active_toward_initial() {
        // never skips the inactive hop
        assert_eq!(
            transition(State::Active, State::Initial).unwrap(),
            Some(Action::Stop)
        );
    }

    #[test]
    fn should_destroy_from_inactive_toward_initial() {
        assert_eq!(
            transition(State::Inactive, State::Initial).unwrap(),
            Some(Action::Destroy)
        );
    }

    #[test]
    fn should_reset_from_failure_toward_any_target() {
        for target in [State::Initial, State::Inactive, State::Active] {
            assert_eq!(
                transition(State::Failure, target).unwrap(),
                Some(Action::Reset)
            );
        }
    }

    #[test]
    fn should_settle_once_converged() {
        for state in [State::Initial, State::Inactive, State::Active] {
            assert_eq!(transition(state, state).unwrap(), None);
        }
    }

    #[test]
    fn should_reject_transient_target_states() {
        let err = transition(State::Initial, State::Creating).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
    }

    #[test]
    fn should_reject_transitions_from_transient_states() {
        let err = transition(State::Starting, State::Active).unwrap_err();
        assert!(matches!(err, Error::NoTransition { .. }));
    }

    #[test]
    fn should_plan_configure_on_inactive_configuration_drift() {
        let (mut current, target) = states(State::Inactive, State::Inactive, "key: value");
        assert_eq!(plan(&current, &target).unwrap(), Some(Action::Configure));

        current.state = State::Active;
        let (_, mut target) = states(State::Active, State::Active, "key: value");
        target.state = State::Active;
        assert_eq!(plan(&current, &target).unwrap(), Some(Action::Reconfigure));
    }

    #[test]
    fn should_not_plan_configure_outside_stable_running_states() {
        let (current, target) = states(State::Initial, State::Initial, "key: value");
        assert_eq!(plan(&current, &target).unwrap(), None);
    }

    #[test]
    fn should_map_actions_to_transients_and_success_states() {
        assert_eq!(Action::Create.transient(), Some(State::Creating));
        assert_eq!(Action::Create.success_state(State::Initial), State::Inactive);
        assert_eq!(Action::Start.success_state(State::Inactive), State::Active);
        assert_eq!(Action::Destroy.success_state(State::Inactive), State::Undefined);
        assert_eq!(Action::Status.transient(), None);
        assert_eq!(Action::Status.success_state(State::Active), State::Active);
    }

    #[test]
    fn should_round_trip_state_names() {
        for state in [
            State::Undefined,
            State::Initial,
            State::Inactive,
            State::Active,
            State::Failure,
            State::Creating,
            State::Resetting,
        ] {
            assert_eq!(state.as_str().parse::<State>().unwrap(), state);
        }
    }
}
