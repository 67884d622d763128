//! Domain models for Tripcraft

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire label for the family-trip party size fallback
const FAMILY_LABEL: &str = "家庭出行";

// ============================================================================
// Travel request
// ============================================================================

/// A normalized travel request extracted from free text or a structured form
///
/// All fields are optional and extracted independently. A request with no
/// fields set is not submittable (see [`crate::intent::render_query`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<PartySize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferences: Vec<String>,
}

impl TravelRequest {
    /// True when no extraction matched at all
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.days.is_none()
            && self.budget.is_none()
            && self.party.is_none()
            && self.preferences.is_empty()
    }
}

/// Party size: an explicit head count, or the family-trip tag inferred from
/// a child-accompaniment phrase with no explicit count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartySize {
    Count(u32),
    Family,
}

impl fmt::Display for PartySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}人", n),
            Self::Family => write!(f, "{}", FAMILY_LABEL),
        }
    }
}

impl Serialize for PartySize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_u32(*n),
            Self::Family => serializer.serialize_str(FAMILY_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for PartySize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PartyVisitor;

        impl Visitor<'_> for PartyVisitor {
            type Value = PartySize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a head count or \"{}\"", FAMILY_LABEL)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(PartySize::Count(v as u32))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(PartySize::Count(v.max(0) as u32))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v == FAMILY_LABEL {
                    Ok(PartySize::Family)
                } else {
                    v.parse::<u32>()
                        .map(PartySize::Count)
                        .map_err(|_| E::custom(format!("invalid party size: {}", v)))
                }
            }
        }

        deserializer.deserialize_any(PartyVisitor)
    }
}

// ============================================================================
// Expense categories
// ============================================================================

/// Closed expense category set shared by the ledger and the reconciler
///
/// Declaration order is the canonical chart order: a reconciliation view
/// lists these categories first so chart colors stay stable across renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "交通")]
    Transport,
    #[serde(rename = "住宿")]
    Lodging,
    #[serde(rename = "餐饮")]
    Dining,
    #[serde(rename = "门票")]
    Tickets,
    #[serde(rename = "购物")]
    Shopping,
    #[serde(rename = "其他")]
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "交通",
            Self::Lodging => "住宿",
            Self::Dining => "餐饮",
            Self::Tickets => "门票",
            Self::Shopping => "购物",
            Self::Other => "其他",
        }
    }

    /// All categories, in canonical chart order
    pub fn all() -> &'static [ExpenseCategory] {
        &[
            Self::Transport,
            Self::Lodging,
            Self::Dining,
            Self::Tickets,
            Self::Shopping,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    /// Accepts the ledger's Chinese labels and the generation service's
    /// English budget keys.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "交通" | "transport" => Ok(Self::Transport),
            "住宿" | "hotel" | "lodging" => Ok(Self::Lodging),
            "餐饮" | "food" | "dining" => Ok(Self::Dining),
            "门票" | "ticket" | "tickets" => Ok(Self::Tickets),
            "购物" | "shopping" => Ok(Self::Shopping),
            "其他" | "other" => Ok(Self::Other),
            _ => Err(format!("Unknown expense category: {}", s)),
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Itinerary plan
// ============================================================================

/// A generated trip plan: ordered days, per-category budget estimate,
/// per-day budget estimate, and personalized tips
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryPlan {
    pub destination: String,
    pub days: u32,
    #[serde(default)]
    pub summary: String,
    pub plan: DaySchedule,
    #[serde(default)]
    pub daily_budget: Vec<DailyBudget>,
    #[serde(default)]
    pub budget: CategoryBudget,
    #[serde(default)]
    pub personalized_tips: Vec<String>,
}

/// Per-day estimated total, aligned by index with the day keys of `plan`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBudget {
    pub day: u32,
    pub estimated_total: f64,
}

/// Insertion-ordered mapping from day key ("day_1".."day_N") to that day's
/// activities, exactly as the generation service returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySchedule(Vec<(String, Vec<Activity>)>);

impl DaySchedule {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push_day(&mut self, key: impl Into<String>, activities: Vec<Activity>) {
        self.0.push((key.into(), activities));
    }

    pub fn get(&self, key: &str) -> Option<&[Activity]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, a)| a.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Activity])> {
        self.0.iter().map(|(k, a)| (k.as_str(), a.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first_day_key(&self) -> Option<&str> {
        self.0.first().map(|(k, _)| k.as_str())
    }
}

impl Serialize for DaySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, activities) in &self.0 {
            map.serialize_entry(key, activities)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DaySchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScheduleVisitor;

        impl<'de> Visitor<'de> for ScheduleVisitor {
            type Value = DaySchedule;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of day keys to activity lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut days = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, activities)) = map.next_entry::<String, Vec<Activity>>()? {
                    days.push((key, activities));
                }
                Ok(DaySchedule(days))
            }
        }

        deserializer.deserialize_map(ScheduleVisitor)
    }
}

/// AI category budget: `total`, an optional currency label, and the category
/// amounts in the order the generation service emitted them
///
/// `total` is not required to equal the category sum; drift is tolerated for
/// display and only logged (see [`crate::ai::parsing`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBudget {
    pub currency: Option<String>,
    pub total: f64,
    categories: Vec<(String, f64)>,
}

impl CategoryBudget {
    pub fn new(total: f64, categories: Vec<(String, f64)>) -> Self {
        Self {
            currency: None,
            total,
            categories,
        }
    }

    /// Category amounts in wire order, without the `total` pseudo-key
    pub fn categories(&self) -> &[(String, f64)] {
        &self.categories
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, v)| *v)
    }

    /// Sum of the category amounts (may drift from `total`)
    pub fn category_sum(&self) -> f64 {
        self.categories.iter().map(|(_, v)| v).sum()
    }
}

impl Serialize for CategoryBudget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = 1 + usize::from(self.currency.is_some());
        let mut map = serializer.serialize_map(Some(self.categories.len() + extra))?;
        if let Some(ref currency) = self.currency {
            map.serialize_entry("currency", currency)?;
        }
        map.serialize_entry("total", &self.total)?;
        for (name, amount) in &self.categories {
            map.serialize_entry(name, amount)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryBudget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BudgetVisitor;

        impl<'de> Visitor<'de> for BudgetVisitor {
            type Value = CategoryBudget;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a budget map with a total and category amounts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut budget = CategoryBudget::default();
                while let Some(key) = map.next_key::<String>()? {
                    let value = map.next_value::<serde_json::Value>()?;
                    match key.as_str() {
                        "currency" => budget.currency = value.as_str().map(String::from),
                        "total" => budget.total = value.as_f64().unwrap_or(0.0),
                        _ => {
                            // Non-numeric values are not category amounts
                            if let Some(amount) = value.as_f64() {
                                budget.categories.push((key, amount));
                            }
                        }
                    }
                }
                Ok(budget)
            }
        }

        deserializer.deserialize_map(BudgetVisitor)
    }
}

// ============================================================================
// Activities and transport
// ============================================================================

/// Activity type as labeled by the generation service
///
/// The set is open: the service is prompted to use the known labels but may
/// emit others, which round-trip through `Other`. `EndOfDay` is produced
/// only by the day organizer for a trailing transport leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Transport,
    Sightseeing,
    Dining,
    Lodging,
    Shopping,
    Entertainment,
    /// Synthetic terminal entry for a day ending on a transport leg
    EndOfDay,
    Other(String),
}

impl ActivityKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Transport => "交通",
            Self::Sightseeing => "景点",
            Self::Dining => "餐饮",
            Self::Lodging => "住宿",
            Self::Shopping => "购物",
            Self::Entertainment => "娱乐",
            Self::EndOfDay => "末段交通",
            Self::Other(s) => s,
        }
    }

    /// True for a transport entry in the generation service's flat day list
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport)
    }
}

impl From<&str> for ActivityKind {
    fn from(s: &str) -> Self {
        match s {
            "交通" => Self::Transport,
            "景点" => Self::Sightseeing,
            "餐饮" => Self::Dining,
            "住宿" => Self::Lodging,
            "购物" => Self::Shopping,
            "娱乐" => Self::Entertainment,
            "末段交通" => Self::EndOfDay,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ActivityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// One scheduled item within a day
///
/// `routes` is the multi-route transport shape as emitted by the generation
/// service on a transport entry; `transport` is the leg attached by the day
/// organizer to the activity it precedes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_location",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteHop>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportLeg>,
}

/// WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Deserialize a location leniently: accept lat/lng or latitude/longitude,
/// numbers or numeric strings, and drop anything malformed or out of range
/// instead of failing the whole activity.
fn lenient_location<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<GeoPoint>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(geo_point_from_value))
}

fn geo_point_from_value(value: &serde_json::Value) -> Option<GeoPoint> {
    let obj = value.as_object()?;
    let coord = |keys: [&str; 2]| -> Option<f64> {
        let v = keys.iter().find_map(|k| obj.get(*k))?;
        v.as_f64().or_else(|| v.as_str()?.trim().parse().ok())
    };
    let point = GeoPoint {
        lat: coord(["lat", "latitude"])?,
        lng: coord(["lng", "longitude"])?,
    };
    point.is_valid().then_some(point)
}

/// The travel segment preceding an activity
///
/// The generation service emits either a single named route or an ordered
/// multi-hop route list; the two shapes are discriminated by the presence
/// of `routes`, and every consumer must handle both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransportLeg {
    Multi(MultiRouteLeg),
    Single(SingleRouteLeg),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleRouteLeg {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRouteLeg {
    pub routes: Vec<RouteHop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteHop {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TransportLeg {
    /// Build a leg from a transport-typed activity in the flat day list
    pub fn from_activity(activity: &Activity) -> Self {
        match &activity.routes {
            Some(routes) => Self::Multi(MultiRouteLeg {
                routes: routes.clone(),
                note: activity.note.clone(),
            }),
            None => Self::Single(SingleRouteLeg {
                name: activity.name.clone(),
                time: activity.time.clone(),
                estimated_cost: activity.estimated_cost,
                detail: activity.detail.clone(),
                note: activity.note.clone(),
            }),
        }
    }

    pub fn estimated_cost(&self) -> f64 {
        match self {
            Self::Single(leg) => leg.estimated_cost,
            Self::Multi(leg) => leg.routes.iter().map(|r| r.estimated_cost).sum(),
        }
    }

    /// Short human-readable description, e.g. "东京站 → 富士山"
    pub fn summary(&self) -> String {
        match self {
            Self::Single(leg) => leg.name.clone(),
            Self::Multi(leg) => leg
                .routes
                .iter()
                .map(|r| format!("{} → {}", r.from, r.to))
                .collect::<Vec<_>>()
                .join("，"),
        }
    }
}

// ============================================================================
// Expenses
// ============================================================================

/// An actual expense recorded against a plan
///
/// The id is assigned by the external store and opaque here. Entries mutate
/// only via explicit update and disappear only via explicit delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub id: i64,
    pub plan_id: String,
    pub username: String,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A new expense before the store assigns it an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub username: String,
    pub plan_id: String,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Derived category → sum projection over a plan's expenses
///
/// First-seen insertion order is preserved; the reconciler relies on it for
/// unrecognized categories. Purely a projection: recomputed on every ledger
/// change, never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySummary(Vec<(String, f64)>);

impl CategorySummary {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add an amount to a category, keeping first-seen order
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.0.iter_mut().find(|(name, _)| name == category) {
            Some((_, sum)) => *sum += amount,
            None => self.0.push((category.to_string(), amount)),
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, sum)| (name.as_str(), *sum))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, v)| v).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for CategorySummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, sum) in &self.0 {
            map.serialize_entry(name, sum)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategorySummary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SummaryVisitor;

        impl<'de> Visitor<'de> for SummaryVisitor {
            type Value = CategorySummary;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of category names to sums")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut summary = CategorySummary::new();
                while let Some((name, sum)) = map.next_entry::<String, f64>()? {
                    summary.0.push((name, sum));
                }
                Ok(summary)
            }
        }

        deserializer.deserialize_map(SummaryVisitor)
    }
}

// ============================================================================
// Stored plans
// ============================================================================

/// Listing row for a user's saved plans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: String,
    pub destination: String,
    #[serde(default)]
    pub summary: String,
    pub days: u32,
    pub created_at: DateTime<Utc>,
}

/// A saved plan as the store returns it: the itinerary plus store metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub plan: ItineraryPlan,
}
