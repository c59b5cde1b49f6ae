use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::entity::EntityID;
use super::snapshot::WorldSnapshot;
use super::world::WorldState;
use crate::error::{CommandError, CommandResult};

/// Ticks this many nominal periods late get a warning.
const LATE_TICK_FACTOR: u32 = 10;

/// Where the driver gets its time from. Ticks always measure their delta as
/// the difference of two readings, never from the nominal period.
pub trait Clock {
    fn now(&self) -> Instant;
    /// Blocks until `deadline`; returns immediately if it has already passed.
    fn sleep_until(&mut self, deadline: Instant);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
    }
}

/// A clock that only moves when told to, or when slept on. Lets a whole run
/// happen as fast as the CPU allows while still reporting sensible deltas.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    now: Instant,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Instant::now(),
        }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now
    }

    fn sleep_until(&mut self, deadline: Instant) {
        if deadline > self.now {
            self.now = deadline;
        }
    }
}

/// Requests from outside the simulation. Applied only between ticks.
#[derive(Debug)]
pub enum Command {
    GetState {
        reply: Sender<WorldSnapshot>,
    },
    FlyTo {
        ship: EntityID,
        target: EntityID,
        reply: Sender<CommandResult<()>>,
    },
    Stop,
}

/// The eventual answer to a command.
#[derive(Debug)]
pub struct Reply<T>(Receiver<T>);

impl<T> Reply<T> {
    /// Blocks until the simulation has processed the command.
    pub fn wait(self) -> Result<T, CommandError> {
        self.0.recv().map_err(|_| CommandError::Disconnected)
    }

    /// The answer, if the command has been processed already.
    pub fn try_take(&self) -> Result<Option<T>, CommandError> {
        match self.0.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(CommandError::Disconnected),
        }
    }
}

/// Cheap, cloneable access to a running simulation from other threads.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    sender: Sender<Command>,
}

impl SimulationHandle {
    fn send<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> Reply<T> {
        let (reply, receiver) = channel();
        // If the simulation is gone, `reply` is dropped with the command and
        // waiting on the receiver reports the disconnect
        let _ = self.sender.send(make(reply));
        Reply(receiver)
    }

    pub fn get_state(&self) -> Reply<WorldSnapshot> {
        self.send(|reply| Command::GetState { reply })
    }

    pub fn fly_to(&self, ship: EntityID, target: EntityID) -> Reply<CommandResult<()>> {
        self.send(|reply| Command::FlyTo {
            ship,
            target,
            reply,
        })
    }

    pub fn stop(&self) {
        let _ = self.sender.send(Command::Stop);
    }
}

/// Measures the achieved tick rate over a sliding window.
#[derive(Debug, Clone)]
pub struct TickRate {
    window_start: Instant,
    counter: usize,
    window: Duration,
    previous_rate: f64,
}

impl TickRate {
    pub fn new(window: Duration, now: Instant) -> Self {
        TickRate {
            window_start: now,
            counter: 0,
            window,
            previous_rate: 0.0,
        }
    }

    /// Ticks per second over the last complete window.
    pub fn value(&self) -> f64 {
        self.previous_rate
    }

    /// Counts one tick; returns true when a window just closed.
    pub fn increment(&mut self, now: Instant) -> bool {
        self.counter += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window {
            self.previous_rate = self.counter as f64 / elapsed.as_secs_f64();
            self.window_start = now;
            self.counter = 0;
            return true;
        }
        false
    }
}

/// The single writer of a [WorldState]. Every mutation, whether a tick or an
/// external command, goes through here, one at a time.
pub struct Simulation<C: Clock = SystemClock> {
    world: WorldState,
    clock: C,
    last_tick: Instant,
    sender: Sender<Command>,
    receiver: Receiver<Command>,
    stopped: bool,
    rate: TickRate,
}

impl Simulation<SystemClock> {
    pub fn new(world: WorldState) -> Self {
        Self::with_clock(world, SystemClock)
    }
}

impl<C: Clock> Simulation<C> {
    pub fn with_clock(world: WorldState, clock: C) -> Self {
        let (sender, receiver) = channel();
        let now = clock.now();
        Simulation {
            world,
            clock,
            last_tick: now,
            sender,
            receiver,
            stopped: false,
            rate: TickRate::new(Duration::from_secs(5), now),
        }
    }

    pub fn handle(&self) -> SimulationHandle {
        SimulationHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn tick_rate(&self) -> f64 {
        self.rate.value()
    }

    /// Forgets how long it's been since the last tick, e.g. after setup took
    /// a while. The next tick's delta is measured from now.
    pub fn start(&mut self) {
        self.last_tick = self.clock.now();
        debug!(tick = self.world.tick_count(), "driver started");
    }

    /// Runs exactly one tick, then applies whatever commands queued up during
    /// it. The periodic driver calls this too, so a forced tick behaves
    /// exactly like a scheduled one.
    ///
    /// Returns the measured delta.
    pub fn tick(&mut self) -> Duration {
        let now = self.clock.now();
        let delta = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;

        let period = self.world.config().tick_period();
        if delta > period * LATE_TICK_FACTOR {
            warn!(?delta, ?period, "tick is running late");
        }

        self.world.update(delta);
        if self.rate.increment(now) {
            debug!(rate = self.rate.value(), "achieved tick rate");
        }

        self.process_commands();
        delta
    }

    /// Drains the command queue against the world.
    pub fn process_commands(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(command) => self.apply(command),
                // We hold a sender ourselves, so the queue never disconnects
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::GetState { reply } => {
                let _ = reply.send(self.world.snapshot());
            }
            Command::FlyTo {
                ship,
                target,
                reply,
            } => {
                let result = self.world.fly_to(ship, target);
                if let Err(err) = &result {
                    debug!(?ship, ?target, %err, "fly_to refused");
                }
                let _ = reply.send(result);
            }
            Command::Stop => {
                info!(tick = self.world.tick_count(), "stopping simulation");
                self.stopped = true;
            }
        }
    }

    /// Ticks on a fixed schedule until `duration` has passed or a stop
    /// command arrives. Returns the number of ticks run.
    ///
    /// Deadlines are laid out from the start time, so a late tick doesn't
    /// push back every tick after it.
    pub fn run_for(&mut self, duration: Duration) -> u64 {
        let period = self.world.config().tick_period();
        let start = self.clock.now();
        let end = start + duration;

        let mut ticks = 0;
        let mut deadline = start + period;
        while !self.stopped && deadline <= end {
            self.clock.sleep_until(deadline);
            self.tick();
            ticks += 1;
            deadline += period;
        }
        ticks
    }

    /// Ticks on a fixed schedule until a stop command arrives.
    pub fn run(&mut self) {
        let period = self.world.config().tick_period();
        let mut deadline = self.clock.now() + period;
        info!(?period, "simulation running");

        while !self.stopped {
            self.clock.sleep_until(deadline);
            self.tick();
            deadline += period;
        }
    }

    pub fn into_world(self) -> WorldState {
        self.world
    }
}
