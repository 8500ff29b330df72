use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct OccupantId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn step(self, direction: Direction) -> Pos {
        let (dx, dy) = direction.delta();
        Pos { y: self.y + dy, x: self.x + dx }
    }

    pub fn cardinal_neighbors(self) -> [Pos; 4] {
        [
            Pos { y: self.y - 1, x: self.x },
            Pos { y: self.y, x: self.x + 1 },
            Pos { y: self.y + 1, x: self.x },
            Pos { y: self.y, x: self.x - 1 },
        ]
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Compass direction with `y` growing southward. `None` is a valid "stay put" request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    None,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL_MOVES: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit `(dx, dy)` offset.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelKind {
    Home,
    Dungeon,
    Volcano,
}

/// Identity of one level. Home is always depth 0; dungeon and volcano depths start at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelId {
    pub kind: LevelKind,
    pub depth: u8,
}

impl LevelId {
    pub const HOME: LevelId = LevelId { kind: LevelKind::Home, depth: 0 };

    pub fn dungeon(depth: u8) -> Self {
        Self { kind: LevelKind::Dungeon, depth }
    }

    pub fn volcano(depth: u8) -> Self {
        Self { kind: LevelKind::Volcano, depth }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonsterKind {
    Rat,
    Bat,
    Goblin,
    Snake,
    Troll,
    FireImp,
    Dragon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OccupantKind {
    Player,
    Monster(MonsterKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Occupant {
    pub id: OccupantId,
    pub kind: OccupantKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
}

/// What an external renderer draws for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Glyph {
    pub symbol: char,
    pub fg: Color,
    pub bg: Color,
}

impl Glyph {
    pub const fn new(symbol: char, fg: Color, bg: Color) -> Self {
        Self { symbol, fg, bg }
    }
}
