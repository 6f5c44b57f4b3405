//! Pairing model: one game between two competitors, finished or pending,
//! or a bye for a single competitor.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::CompetitorId;

/// Opponent value written for a bye.
pub const BYE: &str = "bye";

/// Points credited for a bye that carries no result.
pub const BYE_POINTS: f64 = 1.0;

/// Board value written when no physical board could be allocated.
pub const UNASSIGNED_BOARD: &str = "?";

/// Physical board a game is played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Board {
    /// Board number, starting at 1
    Assigned(u32),
    /// No board was free when the pairing was made
    #[default]
    Unassigned,
}

impl Board {
    /// Board number, if one was allocated.
    pub fn number(&self) -> Option<u32> {
        match self {
            Board::Assigned(n) => Some(*n),
            Board::Unassigned => None,
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Board::Assigned(n) => write!(f, "{}", n),
            Board::Unassigned => write!(f, "{}", UNASSIGNED_BOARD),
        }
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Board::Assigned(n) => serializer.serialize_u32(*n),
            Board::Unassigned => serializer.serialize_str(UNASSIGNED_BOARD),
        }
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None | Some(Raw::Number(0)) => Ok(Board::Unassigned),
            Some(Raw::Number(n)) => Ok(Board::Assigned(n)),
            Some(Raw::Text(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() || trimmed == UNASSIGNED_BOARD {
                    return Ok(Board::Unassigned);
                }
                match trimmed.parse::<u32>() {
                    Ok(0) => Ok(Board::Unassigned),
                    Ok(n) => Ok(Board::Assigned(n)),
                    Err(_) => Err(D::Error::custom(format!("invalid board: {}", text))),
                }
            }
        }
    }
}

/// Parse a result token as written on score sheets.
///
/// Accepts plain numbers plus `1/2`, `½`, `=`, `+` (forfeit win),
/// `-` (forfeit loss) and `bye`. Returns `None` for anything else.
pub fn parse_result_token(token: &str) -> Option<f64> {
    let token = token.trim();
    match token {
        "+" => Some(1.0),
        "-" => Some(0.0),
        "1/2" | "½" | "=" => Some(0.5),
        _ if token.eq_ignore_ascii_case("bye") => Some(1.0),
        _ => token.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0),
    }
}

fn deserialize_result<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(v)) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        Some(Raw::Number(v)) => Err(D::Error::custom(format!("invalid result: {}", v))),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => parse_result_token(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid result: {}", text))),
    }
}

fn deserialize_opponent<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<CompetitorId>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Id(CompetitorId),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Id(id) => Ok(Some(id)),
        Raw::Text(text) if text.trim().eq_ignore_ascii_case(BYE) => Ok(None),
        Raw::Text(text) => Err(D::Error::custom(format!("invalid opponent: {}", text))),
    }
}

fn serialize_opponent<S: Serializer>(
    opponent: &Option<CompetitorId>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match opponent {
        Some(id) => id.serialize(serializer),
        None => serializer.serialize_str(BYE),
    }
}

/// A single game pairing between two competitors.
///
/// The same shape is used for recorded history and for freshly generated
/// pairings (which carry no results yet). A row whose black side is `"bye"`
/// gives White a point without an opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    /// Round number (1-based, per competitor game count)
    pub round: u32,

    /// Board number or the unassigned sentinel
    #[serde(default)]
    pub board: Board,

    /// Competitor playing White
    #[serde(alias = "whiteId")]
    pub white_id: CompetitorId,

    /// Competitor playing Black, `None` for a bye
    #[serde(
        alias = "blackId",
        deserialize_with = "deserialize_opponent",
        serialize_with = "serialize_opponent"
    )]
    pub black_id: Option<CompetitorId>,

    /// White display name, for presentation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_name: Option<String>,

    /// Black display name, for presentation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_name: Option<String>,

    /// White's score, absent while the game is running
    #[serde(
        default,
        alias = "resultWhite",
        deserialize_with = "deserialize_result",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_white: Option<f64>,

    /// Black's score, absent while the game is running
    #[serde(
        default,
        alias = "resultBlack",
        deserialize_with = "deserialize_result",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_black: Option<f64>,
}

impl Pairing {
    /// Create a pending pairing without a board.
    pub fn new(round: u32, white_id: CompetitorId, black_id: CompetitorId) -> Self {
        Self {
            round,
            board: Board::Unassigned,
            white_id,
            black_id: Some(black_id),
            white_name: None,
            black_name: None,
            result_white: None,
            result_black: None,
        }
    }

    /// A bye for `white_id`, worth [`BYE_POINTS`].
    pub fn bye(round: u32, white_id: CompetitorId) -> Self {
        Self {
            round,
            board: Board::Unassigned,
            white_id,
            black_id: None,
            white_name: None,
            black_name: None,
            result_white: Some(BYE_POINTS),
            result_black: None,
        }
    }

    /// No opponent on the black side.
    pub fn is_bye(&self) -> bool {
        self.black_id.is_none()
    }

    /// Points White gets from a bye row; a missing result counts as a full point.
    pub fn bye_points(&self) -> f64 {
        self.result_white.unwrap_or(BYE_POINTS)
    }

    /// Attach display names.
    pub fn with_names(mut self, white_name: String, black_name: String) -> Self {
        self.white_name = Some(white_name);
        self.black_name = Some(black_name);
        self
    }

    /// Attach a board.
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    /// Record both results.
    pub fn with_results(mut self, white: f64, black: f64) -> Self {
        self.result_white = Some(white);
        self.result_black = Some(black);
        self
    }

    /// A pairing is finished iff both results are present. Byes are always
    /// finished.
    pub fn is_finished(&self) -> bool {
        self.is_bye() || (self.result_white.is_some() && self.result_black.is_some())
    }

    /// A pairing with at least one result missing.
    pub fn is_pending(&self) -> bool {
        !self.is_finished()
    }

    /// Whether the competitor takes part in this game.
    pub fn involves(&self, id: CompetitorId) -> bool {
        self.white_id == id || self.black_id == Some(id)
    }
}
