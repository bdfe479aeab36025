use navbridge_core::error::ErrorKind;
use navbridge_core::lifecycle::{
    available_triggers, next_state, transition_graph, LifecycleState, Trigger, ALL_STATES,
};

#[test]
fn route_outcomes_from_requesting_route() {
    let cases = [
        (Trigger::RoutesFound, LifecycleState::Previewing),
        (Trigger::NoRoutes, LifecycleState::Errored),
        (Trigger::RouteFailed, LifecycleState::Errored),
        (Trigger::RouteCanceled, LifecycleState::AwaitingRouteInputs),
        (Trigger::InputsChanged, LifecycleState::RequestingRoute),
        (Trigger::Stop, LifecycleState::Cancelled),
    ];

    for (trigger, expected) in cases {
        let next = next_state(LifecycleState::RequestingRoute, trigger)
            .expect("route outcome should be accepted");
        assert_eq!(next, expected, "{trigger:?}");
    }
}

#[test]
fn guidance_requires_a_preview() {
    for state in ALL_STATES {
        let result = next_state(state, Trigger::StartGuidance);
        if state == LifecycleState::Previewing {
            assert_eq!(result.unwrap(), LifecycleState::Guiding);
        } else {
            assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidTransition);
        }
    }
}

#[test]
fn permission_flow() {
    let waiting = next_state(LifecycleState::Idle, Trigger::EnableAwaitingPermission).unwrap();
    assert_eq!(waiting, LifecycleState::AwaitingPermission);

    let granted = next_state(waiting, Trigger::PermissionGranted).unwrap();
    assert_eq!(granted, LifecycleState::AwaitingRouteInputs);

    for state in [
        LifecycleState::AwaitingPermission,
        LifecycleState::Previewing,
        LifecycleState::Guiding,
    ] {
        assert_eq!(
            next_state(state, Trigger::PermissionDenied).unwrap(),
            LifecycleState::Errored
        );
    }
}

#[test]
fn session_holding_states_accept_stop_and_inputs_change() {
    for state in ALL_STATES.into_iter().filter(|s| s.holds_session()) {
        let triggers = available_triggers(state);
        assert!(triggers.contains(&Trigger::Stop), "{state:?}");
        assert!(triggers.contains(&Trigger::InputsChanged), "{state:?}");
    }
}

#[test]
fn graph_edges_agree_with_table() {
    let graph = transition_graph();
    for edge in &graph.transitions {
        assert_eq!(next_state(edge.start, edge.trigger).unwrap(), edge.goal);
        assert!(available_triggers(edge.start).contains(&edge.trigger));
    }

    let edge_count: usize = ALL_STATES
        .into_iter()
        .map(|s| available_triggers(s).len())
        .sum();
    assert_eq!(graph.transitions.len(), edge_count);
}
