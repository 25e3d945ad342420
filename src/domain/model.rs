use crate::domain::serialization::HexOrDecimalU256;
use chrono::{DateTime, Utc};
use primitive_types::{H160, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_with::serde_as;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::time::Duration;

// uid as 56 bytes: 32 for orderDigest, 20 for ownerAddress and 4 for validTo
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct OrderUid(pub [u8; 56]);

impl Display for OrderUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = [0u8; 2 + 56 * 2];
        bytes[..2].copy_from_slice(b"0x");
        // Unwrap because the length is always correct.
        hex::encode_to_slice(self.0.as_slice(), &mut bytes[2..]).unwrap();
        // Unwrap because the string is always valid utf8.
        let str = std::str::from_utf8(&bytes).unwrap();
        f.write_str(str)
    }
}

impl fmt::Debug for OrderUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Serialize for OrderUid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl<'de> Deserialize<'de> for OrderUid {
    fn deserialize<D>(deserializer: D) -> Result<OrderUid, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor {}
        impl<'de> de::Visitor<'de> for Visitor {
            type Value = OrderUid;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an uid with orderDigest_owner_validTo")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let s = s.strip_prefix("0x").ok_or_else(|| {
                    de::Error::custom(format!(
                        "{s:?} can't be decoded as hex uid because it does not start with '0x'"
                    ))
                })?;
                let mut value = [0u8; 56];
                hex::decode_to_slice(s, value.as_mut()).map_err(|err| {
                    de::Error::custom(format!("failed to decode {s:?} as hex uid: {err}"))
                })?;
                Ok(OrderUid(value))
            }
        }

        deserializer.deserialize_str(Visitor {})
    }
}

/// One auction's competition data as stored in the `solver_competitions`
/// json column.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolverCompetition {
    pub auction_start_block: u64,
    pub competition_simulation_block: u64,
    pub auction: CompetitionAuction,
    pub solutions: Vec<SolverSettlement>,
}

impl SolverCompetition {
    /// Solutions are stored ordered from worst to best; the winning
    /// settlement is the last entry.
    pub fn winning_solution(&self) -> Option<&SolverSettlement> {
        self.solutions.last()
    }
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionAuction {
    pub orders: Vec<OrderUid>,
    #[serde_as(as = "BTreeMap<_, HexOrDecimalU256>")]
    pub prices: BTreeMap<H160, U256>,
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolverSettlement {
    pub solver: String,
    #[serde(default)]
    pub solver_address: H160,
    #[serde(flatten)]
    pub score: Option<Score>,
    #[serde(default)]
    pub ranking: usize,
    #[serde_as(as = "BTreeMap<_, HexOrDecimalU256>")]
    pub clearing_prices: BTreeMap<H160, U256>,
    pub orders: Vec<Order>,
}

#[serde_as]
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Score {
    /// The score is provided by the solver.
    #[serde(rename = "score")]
    Solver(#[serde_as(as = "HexOrDecimalU256")] U256),
    /// The score is calculated by the protocol.
    #[serde(rename = "scoreProtocol")]
    Protocol(#[serde_as(as = "HexOrDecimalU256")] U256),
    /// The score is calculated by the protocol with the solver's
    /// success_probability taken into account.
    #[serde(rename = "scoreProtocolWithSolverRisk")]
    ProtocolWithSolverRisk(#[serde_as(as = "HexOrDecimalU256")] U256),
    /// Deprecated encoding, still present in old rows.
    #[serde(rename = "scoreDiscounted")]
    Discounted(#[serde_as(as = "HexOrDecimalU256")] U256),
}

impl Default for Score {
    fn default() -> Self {
        Self::Protocol(Default::default())
    }
}

impl Score {
    pub fn score(&self) -> U256 {
        match self {
            Self::Solver(score) => *score,
            Self::Protocol(score) => *score,
            Self::ProtocolWithSolverRisk(score) => *score,
            Self::Discounted(score) => *score,
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum Order {
    #[serde(rename_all = "camelCase")]
    Colocated {
        id: OrderUid,
        /// The effective amount that left the user's wallet including all fees.
        #[serde_as(as = "HexOrDecimalU256")]
        sell_amount: U256,
        /// The effective amount the user received after all fees.
        #[serde_as(as = "HexOrDecimalU256")]
        buy_amount: U256,
    },
    #[serde(rename_all = "camelCase")]
    Legacy {
        id: OrderUid,
        #[serde_as(as = "HexOrDecimalU256")]
        executed_amount: U256,
    },
}

/// Outcome summary of one migration task run.
#[derive(Clone, Debug, Serialize)]
pub struct MigrationReport {
    pub task: String,
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl MigrationReport {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            processed: 0,
            skipped: 0,
            failed: 0,
            started_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_uid_round_trip() {
        let uid = OrderUid([0xab; 56]);
        let serialized = serde_json::to_string(&uid).unwrap();
        assert!(serialized.starts_with("\"0xabab"));
        let parsed: OrderUid = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, uid);
    }

    #[test]
    fn test_order_uid_rejects_missing_prefix_and_bad_length() {
        let no_prefix = format!("\"{}\"", "ab".repeat(56));
        assert!(serde_json::from_str::<OrderUid>(&no_prefix).is_err());

        let too_short = format!("\"0x{}\"", "ab".repeat(55));
        assert!(serde_json::from_str::<OrderUid>(&too_short).is_err());
    }

    #[test]
    fn test_deserialize_stored_competition_blob() {
        let uid = format!("0x{}", "11".repeat(56));
        let json = serde_json::json!({
            "auctionStartBlock": 8_547_391u64,
            "competitionSimulationBlock": 8_547_395u64,
            "auction": {
                "orders": [uid],
                "prices": {
                    "0x6810e776880c02933d47db1b9fc05908e5386b96": "0x2e9416d62ef2b0",
                    "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2": "1000000000000000000",
                },
            },
            "solutions": [{
                "solver": "baseline",
                "solverAddress": "0x2c4c28ddbdac9c5e7055b4c863bd2aa26d7fdb47",
                "scoreProtocol": "1000",
                "ranking": 1,
                "clearingPrices": {
                    "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2": "1000000000000000000",
                },
                "orders": [
                    {"id": uid, "executedAmount": "14463217197"},
                ],
            }],
        });
        let competition: SolverCompetition = serde_json::from_value(json).unwrap();

        assert_eq!(competition.auction_start_block, 8_547_391);
        assert_eq!(competition.auction.orders.len(), 1);
        assert_eq!(competition.auction.prices.len(), 2);

        let winner = competition.winning_solution().unwrap();
        assert_eq!(winner.solver, "baseline");
        assert_eq!(winner.score, Some(Score::Protocol(U256::from(1000u64))));
        assert_eq!(winner.score.unwrap().score(), U256::from(1000u64));
        assert!(matches!(winner.orders[0], Order::Legacy { .. }));
    }

    #[test]
    fn test_solution_without_score_parses() {
        let json = serde_json::json!({
            "solver": "quasimodo",
            "clearingPrices": {},
            "orders": [],
        });
        let settlement: SolverSettlement = serde_json::from_value(json).unwrap();
        assert_eq!(settlement.score, None);
        assert_eq!(settlement.ranking, 0);
    }

    #[test]
    fn test_colocated_order_variant() {
        let uid = format!("0x{}", "22".repeat(56));
        let json = serde_json::json!({
            "id": uid,
            "sellAmount": "100",
            "buyAmount": "0x63",
        });
        let order: Order = serde_json::from_value(json).unwrap();
        match order {
            Order::Colocated {
                sell_amount,
                buy_amount,
                ..
            } => {
                assert_eq!(sell_amount, U256::from(100u64));
                assert_eq!(buy_amount, U256::from(99u64));
            }
            Order::Legacy { .. } => panic!("expected colocated variant"),
        }
    }

    #[test]
    fn test_empty_solutions_has_no_winner() {
        let competition = SolverCompetition::default();
        assert!(competition.winning_solution().is_none());
    }
}
