/// Level loader.
///
/// ## File format (`.txt`):
///   Line 1: `<rows> <cols>` (two positive integers)
///   Then exactly `rows` lines of at least `cols` characters each
///   (extra trailing characters are ignored).
///
/// ## Tile legend:
///   'W' = Wall        '.' = Empty
///   'o' = Pellet      'K' = Key
///   'G' = Gate        'P' = Player start (exactly one required)
///   'C' = Chaser start
///
/// ## Sources (priority order):
///   1. `<levels_dir>/level<n>.txt` on disk
///   2. The embedded copy compiled into the binary
///
/// A file that exists but fails to parse is an error, not a silent
/// fallback: the whole file is parsed into a `LevelDef` before the
/// world is touched, so a failed load leaves the previous level state
/// exactly as it was.

use std::fmt;
use std::io;

use crate::config::GameConfig;
use crate::domain::entity::{Chaser, Player};
use crate::domain::tile::Tile;
use crate::sim::world::{Phase, WorldState};

pub const LEVEL_COUNT: usize = 3;

const EMBEDDED: [(&str, &str); LEVEL_COUNT] = [
    ("Easy", include_str!("../../levels/level1.txt")),
    ("Medium", include_str!("../../levels/level2.txt")),
    ("Hard", include_str!("../../levels/level3.txt")),
];

/// Parsed level, ready to be installed into the world.
#[derive(Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    pub tiles: Vec<Vec<Tile>>,
    pub player_start: (usize, usize),
    pub chaser_starts: Vec<(usize, usize)>,
}

// ── Errors ──

#[derive(Debug)]
pub enum LevelError {
    Io(io::Error),
    MissingHeader,
    BadHeader(String),
    MissingRow { expected: usize, found: usize },
    ShortRow { line: usize, expected: usize, found: usize },
    BadSymbol { line: usize, col: usize, symbol: char },
    NoPlayerStart,
    MultiplePlayerStarts,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "cannot read level file: {e}"),
            LevelError::MissingHeader => write!(f, "missing header line"),
            LevelError::BadHeader(h) => {
                write!(f, "bad header {h:?}: expected \"<rows> <cols>\"")
            }
            LevelError::MissingRow { expected, found } => {
                write!(f, "expected {expected} rows, found {found}")
            }
            LevelError::ShortRow { line, expected, found } => {
                write!(f, "line {line}: expected {expected} cells, found {found}")
            }
            LevelError::BadSymbol { line, col, symbol } => {
                write!(f, "line {line}, column {col}: unknown symbol {symbol:?}")
            }
            LevelError::NoPlayerStart => write!(f, "no player start ('P') in level"),
            LevelError::MultiplePlayerStarts => {
                write!(f, "more than one player start ('P') in level")
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LevelError {
    fn from(e: io::Error) -> Self {
        LevelError::Io(e)
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load level `idx` (0-based) into the world.
///
/// Replaces grid, player, score, key flag, and chaser list in one go.
/// On error the world is untouched: no partial loads, no retry.
pub fn load_level(
    world: &mut WorldState,
    idx: usize,
    config: &GameConfig,
) -> Result<(), LevelError> {
    let def = resolve_level(idx, config)?;
    install(world, idx, def);
    Ok(())
}

/// Display names for the level select (disk presence not required).
pub fn level_names() -> Vec<String> {
    EMBEDDED.iter().map(|(name, _)| name.to_string()).collect()
}

/// Parse a level from its text content.
pub fn parse_level(name: &str, text: &str) -> Result<LevelDef, LevelError> {
    let mut lines = text.lines();

    let header = lines.next().ok_or(LevelError::MissingHeader)?;
    let (rows, cols) = parse_header(header)?;

    let mut tiles = vec![vec![Tile::Empty; cols]; rows];
    let mut player_start = None;
    let mut chaser_starts = vec![];
    let mut found = 0;

    for r in 0..rows {
        let line = lines.next().ok_or(LevelError::MissingRow {
            expected: rows,
            found,
        })?;
        found += 1;

        let mut cells = line.chars();
        for c in 0..cols {
            let symbol = cells.next().ok_or_else(|| LevelError::ShortRow {
                line: r + 2, // 1-based, after the header line
                expected: cols,
                found: line.chars().count(),
            })?;
            tiles[r][c] = match symbol {
                'W' => Tile::Wall,
                '.' => Tile::Empty,
                'o' => Tile::Pellet,
                'K' => Tile::Key,
                'G' => Tile::Gate,
                'P' => {
                    if player_start.replace((r, c)).is_some() {
                        return Err(LevelError::MultiplePlayerStarts);
                    }
                    Tile::Empty // start marker, not terrain
                }
                'C' => {
                    chaser_starts.push((r, c));
                    Tile::Empty
                }
                other => {
                    return Err(LevelError::BadSymbol {
                        line: r + 2,
                        col: c + 1,
                        symbol: other,
                    })
                }
            };
        }
    }

    let player_start = player_start.ok_or(LevelError::NoPlayerStart)?;

    Ok(LevelDef {
        name: name.to_string(),
        rows,
        cols,
        tiles,
        player_start,
        chaser_starts,
    })
}

// ══════════════════════════════════════════════════════════════
// Internal
// ══════════════════════════════════════════════════════════════

fn parse_header(header: &str) -> Result<(usize, usize), LevelError> {
    let mut parts = header.split_whitespace();
    let rows = parts.next().and_then(|p| p.parse::<usize>().ok());
    let cols = parts.next().and_then(|p| p.parse::<usize>().ok());
    match (rows, cols, parts.next()) {
        (Some(r), Some(c), None) if r > 0 && c > 0 => Ok((r, c)),
        _ => Err(LevelError::BadHeader(header.to_string())),
    }
}

/// Fetch level text: disk file if present, embedded copy otherwise.
fn resolve_level(idx: usize, config: &GameConfig) -> Result<LevelDef, LevelError> {
    let (name, embedded) = EMBEDDED
        .get(idx)
        .copied()
        .ok_or_else(|| {
            LevelError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no level {}", idx + 1),
            ))
        })?;

    let path = config.levels_dir.join(format!("level{}.txt", idx + 1));
    if path.is_file() {
        let text = std::fs::read_to_string(&path)?;
        parse_level(name, &text)
    } else {
        parse_level(name, embedded)
    }
}

/// Install a parsed level. Infallible: all validation already happened.
fn install(world: &mut WorldState, idx: usize, def: LevelDef) {
    world.tiles = def.tiles;
    world.rows = def.rows;
    world.cols = def.cols;
    world.player = Player::new(def.player_start.0, def.player_start.1);
    world.chasers = def
        .chaser_starts
        .iter()
        .enumerate()
        .map(|(id, &(r, c))| Chaser::new(id, r, c))
        .collect();
    world.current_level = idx;
    world.phase = Phase::Playing;
    world.set_message(&def.name, 40);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn small_level() -> &'static str {
        "3 4\nWWWW\nWPoW\nWWWW\n"
    }

    #[test]
    fn parses_dimensions_from_header() {
        let def = parse_level("t", small_level()).unwrap();
        assert_eq!((def.rows, def.cols), (3, 4));
        assert_eq!(def.tiles.len(), 3);
        assert!(def.tiles.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn start_markers_become_empty_terrain() {
        let def = parse_level("t", "1 4\nPC.o").unwrap();
        assert_eq!(def.player_start, (0, 0));
        assert_eq!(def.chaser_starts, vec![(0, 1)]);
        assert_eq!(def.tiles[0][0], Tile::Empty);
        assert_eq!(def.tiles[0][1], Tile::Empty);
        assert_eq!(def.tiles[0][3], Tile::Pellet);
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(matches!(
            parse_level("t", "three four\nWWWW"),
            Err(LevelError::BadHeader(_))
        ));
        assert!(matches!(
            parse_level("t", "3\nWWW"),
            Err(LevelError::BadHeader(_))
        ));
        assert!(matches!(
            parse_level("t", "0 4\n"),
            Err(LevelError::BadHeader(_))
        ));
        assert!(matches!(parse_level("t", ""), Err(LevelError::MissingHeader)));
    }

    #[test]
    fn rejects_short_row() {
        let err = parse_level("t", "2 4\nWWWW\nWP").unwrap_err();
        assert!(matches!(
            err,
            LevelError::ShortRow { line: 3, expected: 4, found: 2 }
        ));
    }

    #[test]
    fn rejects_missing_rows() {
        assert!(matches!(
            parse_level("t", "3 4\nWWWW\nWP.W"),
            Err(LevelError::MissingRow { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn rejects_unknown_symbol() {
        assert!(matches!(
            parse_level("t", "1 3\nP?."),
            Err(LevelError::BadSymbol { symbol: '?', .. })
        ));
    }

    #[test]
    fn requires_exactly_one_player_start() {
        assert!(matches!(
            parse_level("t", "1 3\n.o."),
            Err(LevelError::NoPlayerStart)
        ));
        assert!(matches!(
            parse_level("t", "1 3\nP.P"),
            Err(LevelError::MultiplePlayerStarts)
        ));
    }

    #[test]
    fn extra_trailing_characters_ignored() {
        let def = parse_level("t", "1 3\nPo.   trailing junk").unwrap();
        assert_eq!(def.cols, 3);
    }

    #[test]
    fn embedded_levels_all_parse() {
        for (name, text) in EMBEDDED {
            let def = parse_level(name, text).expect(name);
            assert!(def.rows >= 5, "{name} suspiciously small");
            assert!(!def.chaser_starts.is_empty(), "{name} has no chasers");
            let has_key = def.tiles.iter().flatten().any(|t| t.is_key());
            let has_gate = def.tiles.iter().flatten().any(|t| t.is_gate());
            assert!(has_key && has_gate, "{name} missing key or gate");
        }
    }

    #[test]
    fn failed_load_leaves_world_untouched() {
        let config = GameConfig::default_for_tests();
        let mut world = WorldState::new(config.speed.clone());
        let def = parse_level("seed", small_level()).unwrap();
        install(&mut world, 0, def);
        world.player.score = 7;
        let before_rows = world.rows;

        // Point the loader at a directory holding a corrupt level file.
        let dir = std::env::temp_dir().join("keymaze-bad-level-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("level2.txt"), "2 2\nWW").unwrap();
        let mut bad_config = config;
        bad_config.levels_dir = dir.clone();

        assert!(load_level(&mut world, 1, &bad_config).is_err());
        assert_eq!(world.rows, before_rows);
        assert_eq!(world.player.score, 7);
        assert_eq!(world.current_level, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn successful_load_replaces_everything() {
        let config = GameConfig::default_for_tests();
        let mut world = WorldState::new(config.speed.clone());
        world.player.score = 99;
        world.player.has_key = true;

        load_level(&mut world, 0, &config).unwrap();
        assert_eq!(world.phase, Phase::Playing);
        assert_eq!(world.player.score, 0);
        assert!(!world.player.has_key);
        assert_eq!(world.current_level, 0);
        assert!(world.rows > 0 && world.cols > 0);
    }
}
