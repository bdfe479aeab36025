use super::{next_state, LifecycleState, Trigger, ALL_STATES, ALL_TRIGGERS};

/// Lifecycle transition graph derived from the state/trigger table.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionGraph {
    pub states: Vec<LifecycleState>,
    pub transitions: Vec<TransitionEdge>,
}

/// Directed lifecycle transition edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransitionEdge {
    pub start: LifecycleState,
    pub trigger: Trigger,
    pub goal: LifecycleState,
}

impl TransitionGraph {
    /// States reachable from `start` by any sequence of triggers.
    pub fn reachable_from(&self, start: LifecycleState) -> Vec<LifecycleState> {
        let mut seen = vec![start];
        let mut frontier = vec![start];
        while let Some(state) = frontier.pop() {
            for edge in self.transitions.iter().filter(|e| e.start == state) {
                if !seen.contains(&edge.goal) {
                    seen.push(edge.goal);
                    frontier.push(edge.goal);
                }
            }
        }
        seen
    }
}

/// Build the canonical lifecycle transition graph.
pub fn transition_graph() -> TransitionGraph {
    let mut transitions = Vec::new();

    for start in ALL_STATES {
        for trigger in ALL_TRIGGERS {
            if let Ok(goal) = next_state(start, trigger) {
                transitions.push(TransitionEdge {
                    start,
                    trigger,
                    goal,
                });
            }
        }
    }

    TransitionGraph {
        states: ALL_STATES.to_vec(),
        transitions,
    }
}
