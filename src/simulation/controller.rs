use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::customers::{Customer, OrderDraft};
use crate::error::Rejection;
use crate::garden::GameState;
use crate::progression::level_params;
use crate::simulation::commands::{apply_command, Command};
use crate::simulation::events::GameEvent;
use crate::simulation::{execute_tick, TickResult, TickRules};

/// Parameters for an out-of-band order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerRequest {
    /// Level at the time the request was issued.
    pub level: u8,
    /// Seed for the fallback generator, drawn from the simulation RNG.
    pub rng_seed: u64,
}

/// Sole owner of the game state. Commands, ticks and customer merges all go
/// through here so there is exactly one writer.
pub struct Simulation {
    state: GameState,
    rng: ChaCha8Rng,
    rules: TickRules,
    revision: u64,
    observed_level: u8,
    customer_pending: bool,
}

impl Simulation {
    pub fn new(state: GameState, rules: TickRules, seed: u64) -> Self {
        let observed_level = state.level();
        Simulation {
            state,
            rng: ChaCha8Rng::seed_from_u64(seed),
            rules,
            revision: 0,
            observed_level,
            customer_pending: false,
        }
    }

    /// A brand-new game whose starter seeds come from the same RNG stream.
    pub fn fresh(rules: TickRules, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = GameState::new(&mut rng);
        Simulation {
            observed_level: state.level(),
            state,
            rng,
            rules,
            revision: 0,
            customer_pending: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Bumped on every committed change; lets autosave skip idle periods.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Fully committed copy of the current state.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn apply(&mut self, command: Command) -> Result<Vec<GameEvent>, Rejection> {
        let mut events = apply_command(&mut self.state, command, &mut self.rng)?;
        self.check_level(&mut events);
        if !events.is_empty() {
            self.revision += 1;
        }
        Ok(events)
    }

    pub fn tick(&mut self) -> TickResult {
        let mut result = execute_tick(&mut self.state, &self.rules);
        self.check_level(&mut result.events);
        if result.changed {
            self.revision += 1;
        }
        result
    }

    /// Ask for a new customer if there is room for one and none is already on
    /// the way. Marks the request as pending.
    pub fn customer_request(&mut self) -> Option<CustomerRequest> {
        if self.customer_pending || !self.accepting_customers() {
            return None;
        }
        self.customer_pending = true;
        let request = CustomerRequest {
            level: self.state.level(),
            rng_seed: self.rng.r#gen(),
        };
        debug!(level = request.level, "Customer requested");
        Some(request)
    }

    /// Drop the pending flag without adding anyone.
    pub fn cancel_customer_request(&mut self) {
        self.customer_pending = false;
    }

    /// Seat a customer produced for an earlier request. The draft is dropped
    /// if the shop has filled up, been paused, or entered the tutorial since.
    pub fn merge_customer(&mut self, level: u8, draft: OrderDraft) -> Option<Vec<GameEvent>> {
        self.customer_pending = false;
        if !self.accepting_customers() {
            debug!(name = %draft.name, "Dropping stale customer draft");
            return None;
        }
        let customer = Customer::from_draft(draft, &level_params(level), &mut self.rng);
        info!(
            customer = %customer.id,
            name = %customer.name,
            wants = %customer.requirements.summary(),
            "Customer arrived"
        );
        let events = vec![GameEvent::CustomerArrived {
            customer: customer.id,
        }];
        self.state.customers.push(customer);
        self.revision += 1;
        Some(events)
    }

    /// Fresh seed for work done off the owning task, such as hint generation.
    pub fn draw_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }

    /// True with probability `p`, drawn from the simulation RNG.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    fn accepting_customers(&self) -> bool {
        let cap = level_params(self.state.level()).max_customers;
        !self.state.is_paused
            && !self.state.tutorial_step.is_scripted()
            && self.state.customers.len() < cap
    }

    fn check_level(&mut self, events: &mut Vec<GameEvent>) {
        let level = self.state.level();
        if level > self.observed_level {
            info!(level, "Level up");
            events.push(GameEvent::LevelUp { level });
        }
        self.observed_level = level;
    }
}
