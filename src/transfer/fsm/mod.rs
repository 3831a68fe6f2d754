//! Function-pointer finite state machine for the transfer handshake.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable                                                │
//! │  ┌────────────────┬───────────┬───────────────────────────┐│
//! │  │ StateId        │ on_enter  │ on_event                  ││
//! │  ├────────────────┼───────────┼───────────────────────────┤│
//! │  │ AwaitHeaderAck │ fn(ctx)   │ fn(ctx, ev) -> Option<>   ││
//! │  │ SendingData    │ fn(ctx)   │ fn(ctx, ev) -> Option<>   ││
//! │  │ WaitingPaused  │ fn(ctx)   │ fn(ctx, ev) -> Option<>   ││
//! │  │ Done           │ fn(ctx)   │ fn(ctx, ev) -> Option<>   ││
//! │  │ Aborted        │ fn(ctx)   │ fn(ctx, ev) -> Option<>   ││
//! │  └────────────────┴───────────┴───────────────────────────┘│
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The controller feeds every wait outcome to [`HandshakeFsm::handle`].
//! If the current state's `on_event` returns `Some(next_id)`, the engine
//! runs `on_exit` for the current state, then `on_enter` for the next.
//! `Done` is reached only by [`HandshakeFsm::force_transition`], once the
//! session has no samples left.

pub mod context;
pub mod states;

use context::{HandshakeContext, HandshakeEvent};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all handshake states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    AwaitHeaderAck = 0,
    SendingData = 1,
    WaitingPaused = 2,
    Done = 3,
    Aborted = 4,
}

impl StateId {
    /// Total number of states, sizes the table array.
    pub const COUNT: usize = 5;

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Aborted` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::AwaitHeaderAck,
            1 => Self::SendingData,
            2 => Self::WaitingPaused,
            3 => Self::Done,
            4 => Self::Aborted,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Aborted
            }
        }
    }

    /// No further events change a terminal state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut HandshakeContext);

/// Signature for the per-event handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateEventFn = fn(&mut HandshakeContext, HandshakeEvent) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_event: StateEventFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct HandshakeFsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    event_count: u64,
    /// Event count at which the current state was entered.
    state_entry_event: u64,
}

impl HandshakeFsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, row)| row.id as usize == i),
            "state table rows out of order"
        );
        Self {
            table,
            current: initial as usize,
            event_count: 0,
            state_entry_event: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `handle()`.
    pub fn start(&mut self, ctx: &mut HandshakeContext) {
        info!("handshake starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Feed one event to the current state and apply any transition.
    pub fn handle(&mut self, event: HandshakeEvent, ctx: &mut HandshakeContext) {
        self.event_count += 1;
        ctx.events_in_state = self.event_count - self.state_entry_event;

        if let Some(next_id) = (self.table[self.current].on_event)(ctx, event) {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (used to finish the transfer and to
    /// abort on transport failure).
    pub fn force_transition(&mut self, next: StateId, ctx: &mut HandshakeContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn events_in_current_state(&self) -> u64 {
        self.event_count - self.state_entry_event
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut HandshakeContext) {
        let next_idx = next_id as usize;

        info!(
            "handshake transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_event = self.event_count;
        ctx.events_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
