use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identity of an actor, shared by the live world and the persisted
/// `characters.obj_id` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub i64);

impl ActorId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl From<i64> for ActorId {
    fn from(value: i64) -> Self {
        ActorId(value)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// World coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Perturbs x and y independently by a uniform integer in
    /// `[-radius, radius]`. z is never touched; a radius of zero or less
    /// returns the position unchanged. Results clamp at the `i32` bounds.
    pub fn jittered<R: Rng + ?Sized>(&self, radius: i32, rng: &mut R) -> Position {
        if radius <= 0 {
            return *self;
        }
        Position {
            x: self.x.saturating_add(rng.gen_range(-radius..=radius)),
            y: self.y.saturating_add(rng.gen_range(-radius..=radius)),
            z: self.z,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A character class an actor can be created with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassProfile {
    pub id: i64,
    pub name: String,
}

impl ClassProfile {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Name as shown to the operator (`HUMAN_FIGHTER` -> `HUMAN FIGHTER`).
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }
}

impl fmt::Display for ClassProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

const DEFAULT_CLASSES: &[&str] = &[
    "HUMAN_FIGHTER",
    "WARRIOR",
    "GLADIATOR",
    "WARLORD",
    "KNIGHT",
    "PALADIN",
    "DARK_AVENGER",
    "ROGUE",
    "TREASURE_HUNTER",
    "HAWKEYE",
    "HUMAN_MYSTIC",
    "HUMAN_WIZARD",
    "SORCERER",
    "NECROMANCER",
    "WARLOCK",
    "CLERIC",
    "BISHOP",
    "PROPHET",
    "ELVEN_FIGHTER",
    "ELVEN_KNIGHT",
    "TEMPLE_KNIGHT",
    "SWORD_SINGER",
    "ELVEN_SCOUT",
    "PLAINS_WALKER",
    "SILVER_RANGER",
    "ELVEN_MYSTIC",
    "ELVEN_WIZARD",
    "SPELLSINGER",
    "ELEMENTAL_SUMMONER",
    "ELVEN_ORACLE",
    "ELVEN_ELDER",
    "DARK_FIGHTER",
    "PALUS_KNIGHT",
    "SHILLIEN_KNIGHT",
    "BLADEDANCER",
    "ASSASSIN",
    "ABYSS_WALKER",
    "PHANTOM_RANGER",
    "DARK_MYSTIC",
    "DARK_WIZARD",
    "SPELLHOWLER",
    "PHANTOM_SUMMONER",
    "SHILLIEN_ORACLE",
    "SHILLIEN_ELDER",
    "ORC_FIGHTER",
    "ORC_RAIDER",
    "DESTROYER",
    "ORC_MONK",
    "TYRANT",
    "ORC_MYSTIC",
    "ORC_SHAMAN",
    "OVERLORD",
    "WARCRYER",
    "DWARVEN_FIGHTER",
    "SCAVENGER",
    "BOUNTY_HUNTER",
    "ARTISAN",
    "WARSMITH",
];

/// Resolves persisted `classid` values into class profiles.
#[derive(Debug, Clone)]
pub struct ClassCatalog {
    classes: BTreeMap<i64, ClassProfile>,
}

impl ClassCatalog {
    pub fn empty() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, id: i64, name: impl Into<String>) -> Self {
        self.classes.insert(id, ClassProfile::new(id, name));
        self
    }

    /// `None` for negative, out of range or unregistered ids.
    pub fn resolve(&self, class_id: i64) -> Option<ClassProfile> {
        self.classes.get(&class_id).cloned()
    }

    pub fn by_name(&self, name: &str) -> Option<ClassProfile> {
        self.classes
            .values()
            .find(|class| class.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn all(&self) -> impl Iterator<Item = &ClassProfile> {
        self.classes.values()
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        DEFAULT_CLASSES
            .iter()
            .enumerate()
            .fold(Self::empty(), |catalog, (id, name)| catalog.with(id as i64, *name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointKind {
    Town,
    Farm,
    Pvp,
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKind::Town => write!(f, "TOWN"),
            PointKind::Farm => write!(f, "FARM"),
            PointKind::Pvp => write!(f, "PVP"),
        }
    }
}

/// A named world location used as the base coordinate for create and spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportPoint {
    pub name: String,
    pub kind: PointKind,
    pub base: Position,
}

impl TeleportPoint {
    pub fn new(name: impl Into<String>, kind: PointKind, base: Position) -> Self {
        Self {
            name: name.into(),
            kind,
            base,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointCatalog {
    points: Vec<TeleportPoint>,
}

impl PointCatalog {
    pub fn new(points: Vec<TeleportPoint>) -> Self {
        Self { points }
    }

    pub fn of_kind(&self, kind: PointKind) -> impl Iterator<Item = &TeleportPoint> {
        self.points.iter().filter(move |point| point.kind == kind)
    }

    pub fn by_name(&self, name: &str) -> Option<&TeleportPoint> {
        self.points
            .iter()
            .find(|point| point.name.eq_ignore_ascii_case(name))
    }

    pub fn all(&self) -> &[TeleportPoint] {
        &self.points
    }
}

impl Default for PointCatalog {
    fn default() -> Self {
        Self::new(vec![
            TeleportPoint::new("Giran Town", PointKind::Town, Position::new(83400, 147943, -3404)),
            TeleportPoint::new("Aden Town", PointKind::Town, Position::new(146331, 25762, -2018)),
            TeleportPoint::new("Dion Town", PointKind::Town, Position::new(15670, 142983, -2705)),
            TeleportPoint::new("Gludio Town", PointKind::Town, Position::new(-14225, 123540, -3121)),
            TeleportPoint::new("Cruma Tower", PointKind::Farm, Position::new(17724, 114004, -11672)),
            TeleportPoint::new("Dragon Valley", PointKind::Farm, Position::new(73024, 118485, -3720)),
            TeleportPoint::new("Coliseum", PointKind::Pvp, Position::new(146440, 46723, -3432)),
        ])
    }
}
