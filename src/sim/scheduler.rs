/// Two logical tick sources multiplexed onto one ordered queue.
///
/// The player step and the chaser step run at independent fixed
/// intervals, but both are drained serially on the single game-loop
/// thread, so a player tick and a chaser tick can never interleave
/// mid-step. Due sources come out oldest-deadline first; an exact tie
/// goes to the player so tick order is deterministic.
///
/// Reconfiguring one source (the speed control touches only the player
/// interval) never disturbs the other's deadline.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickSource {
    Player,
    Chaser,
}

pub struct TickScheduler {
    player_interval: Duration,
    chaser_interval: Duration,
    player_due: Instant,
    chaser_due: Instant,
    paused: bool,
}

impl TickScheduler {
    pub fn new(player_ms: u64, chaser_ms: u64) -> Self {
        let now = Instant::now();
        let player_interval = Duration::from_millis(player_ms);
        let chaser_interval = Duration::from_millis(chaser_ms);
        TickScheduler {
            player_interval,
            chaser_interval,
            player_due: now + player_interval,
            chaser_due: now + chaser_interval,
            paused: true, // nothing ticks until a level starts
        }
    }

    /// Change one source's interval. Takes effect from `now`: the
    /// source's next deadline is rescheduled, the other is untouched.
    pub fn set_interval(&mut self, source: TickSource, ms: u64, now: Instant) {
        let interval = Duration::from_millis(ms);
        match source {
            TickSource::Player => {
                self.player_interval = interval;
                self.player_due = now + interval;
            }
            TickSource::Chaser => {
                self.chaser_interval = interval;
                self.chaser_due = now + interval;
            }
        }
    }

    #[allow(dead_code)]
    pub fn interval_ms(&self, source: TickSource) -> u64 {
        match source {
            TickSource::Player => self.player_interval.as_millis() as u64,
            TickSource::Chaser => self.chaser_interval.as_millis() as u64,
        }
    }

    /// Stop ticking (terminal state, title screen).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume with fresh deadlines so a long pause doesn't burst.
    pub fn resume(&mut self, now: Instant) {
        self.paused = false;
        self.player_due = now + self.player_interval;
        self.chaser_due = now + self.chaser_interval;
    }

    #[allow(dead_code)]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Next due source at `now`, if any. Advances that source's
    /// deadline from `now` (no catch-up bursts after a stall).
    pub fn poll(&mut self, now: Instant) -> Option<TickSource> {
        if self.paused {
            return None;
        }
        let player_ready = self.player_due <= now;
        let chaser_ready = self.chaser_due <= now;

        let source = match (player_ready, chaser_ready) {
            (false, false) => return None,
            (true, false) => TickSource::Player,
            (false, true) => TickSource::Chaser,
            // Both due: oldest deadline first, player wins exact ties.
            (true, true) => {
                if self.chaser_due < self.player_due {
                    TickSource::Chaser
                } else {
                    TickSource::Player
                }
            }
        };

        match source {
            TickSource::Player => self.player_due = now + self.player_interval,
            TickSource::Chaser => self.chaser_due = now + self.chaser_interval,
        }
        Some(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    fn running(player_ms: u64, chaser_ms: u64) -> (TickScheduler, Instant) {
        let mut s = TickScheduler::new(player_ms, chaser_ms);
        let base = Instant::now();
        s.resume(base);
        (s, base)
    }

    #[test]
    fn paused_scheduler_yields_nothing() {
        let mut s = TickScheduler::new(10, 20);
        assert!(s.is_paused());
        assert_eq!(s.poll(Instant::now() + Duration::from_secs(5)), None);
    }

    #[test]
    fn nothing_due_before_first_interval() {
        let (mut s, base) = running(100, 200);
        assert_eq!(s.poll(at(base, 50)), None);
    }

    #[test]
    fn sources_fire_at_their_own_rates() {
        let (mut s, base) = running(100, 250);
        assert_eq!(s.poll(at(base, 100)), Some(TickSource::Player));
        assert_eq!(s.poll(at(base, 100)), None);
        assert_eq!(s.poll(at(base, 250)), Some(TickSource::Player)); // due at 200
        assert_eq!(s.poll(at(base, 250)), Some(TickSource::Chaser));
        assert_eq!(s.poll(at(base, 250)), None);
    }

    #[test]
    fn oldest_deadline_drains_first() {
        let (mut s, base) = running(200, 150);
        // At t=300 both are overdue; chaser's deadline (150) is older.
        assert_eq!(s.poll(at(base, 300)), Some(TickSource::Chaser));
        assert_eq!(s.poll(at(base, 300)), Some(TickSource::Player));
        assert_eq!(s.poll(at(base, 300)), None);
    }

    #[test]
    fn exact_tie_goes_to_player() {
        let (mut s, base) = running(100, 100);
        assert_eq!(s.poll(at(base, 100)), Some(TickSource::Player));
        assert_eq!(s.poll(at(base, 100)), Some(TickSource::Chaser));
    }

    #[test]
    fn no_catch_up_burst_after_stall() {
        let (mut s, base) = running(100, 10_000);
        // Stall 1s: exactly one player tick comes out, not ten.
        assert_eq!(s.poll(at(base, 1000)), Some(TickSource::Player));
        assert_eq!(s.poll(at(base, 1000)), None);
        // Next deadline counts from the poll, not the missed slots.
        assert_eq!(s.poll(at(base, 1050)), None);
        assert_eq!(s.poll(at(base, 1100)), Some(TickSource::Player));
    }

    #[test]
    fn retuning_player_leaves_chaser_deadline_alone() {
        let (mut s, base) = running(100, 300);
        s.set_interval(TickSource::Player, 50, at(base, 0));
        assert_eq!(s.interval_ms(TickSource::Player), 50);
        assert_eq!(s.interval_ms(TickSource::Chaser), 300);
        assert_eq!(s.poll(at(base, 50)), Some(TickSource::Player));
        // At t=300 the player's deadline (100) is older and drains
        // first; the chaser still fires at its original deadline.
        assert_eq!(s.poll(at(base, 300)), Some(TickSource::Player));
        assert_eq!(s.poll(at(base, 300)), Some(TickSource::Chaser));
        assert_eq!(s.poll(at(base, 300)), None);
    }

    #[test]
    fn resume_resets_deadlines() {
        let (mut s, base) = running(100, 100);
        s.pause();
        assert_eq!(s.poll(at(base, 500)), None);
        s.resume(at(base, 500));
        assert_eq!(s.poll(at(base, 550)), None);
        assert_eq!(s.poll(at(base, 600)), Some(TickSource::Player));
    }
}
