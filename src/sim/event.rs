/// Events emitted during a simulation step.
/// The presentation layer consumes these for HUD messages.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PelletPicked { row: usize, col: usize },
    KeyPicked,
    LevelWon,
    PlayerCaught,
}
